//! Walk through the ledger on the in-memory backend: genesis, bookkeeper
//! election, commit notification, bonus calculation and the default registry.
//!
//! Run with `RUST_LOG=debug cargo run -p chain-db --example ledger_demo`.

use chain_consensus::ConsensusConfig;
use chain_core::{
    genesis_block, governing_token, Block, Fixed8, Hash160, PublicKey, Transaction,
    TransactionInput, TransactionOutput, TransactionType,
};
use chain_db::{Blockchain, Ledger, LedgerRegistry, MemoryBlockchain};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn governing(units: i64) -> anyhow::Result<TransactionOutput> {
    Ok(TransactionOutput::new(
        governing_token().hash(),
        Fixed8::from_units(units)?,
        Hash160::zero(),
    ))
}

fn candidate_key() -> anyhow::Result<PublicKey> {
    let mut bytes = [0x5a; 33];
    bytes[0] = 0x02;
    (0..=u8::MAX)
        .find_map(|tweak| {
            bytes[32] = tweak;
            PublicKey::decode(&bytes).ok()
        })
        .ok_or_else(|| anyhow::anyhow!("no curve point with this X prefix"))
}

fn commit(ledger: &Ledger, transactions: Vec<Transaction>) -> anyhow::Result<Block> {
    let miners = ledger.get_miners_with(&transactions)?;
    let height = ledger.height() + 1;
    let block = Block::new(
        0,
        ledger.current_block_hash(),
        genesis_block().header().timestamp() + 15 * height,
        height,
        u64::from(height),
        Ledger::get_miner_address(&miners)?,
        transactions,
    );
    anyhow::ensure!(ledger.add_block(&block)?, "block #{} rejected", height);
    Ok(block)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Ledger Demo");
    println!("===========");

    println!("\n1. Opening an in-memory ledger...");
    let ledger = Arc::new(Ledger::new(
        Arc::new(MemoryBlockchain::new()),
        ConsensusConfig::default(),
    )?);
    let genesis = genesis_block();
    println!("   Genesis hash: {}", genesis.hash());
    println!("   Genesis transactions: {}", genesis.transactions().len());
    println!("   Height: {}", ledger.height());
    println!("   Abilities: {}", ledger.ability());

    println!("\n2. Standby bookkeepers...");
    for (i, key) in ledger.standby_miners().iter().enumerate() {
        println!("   #{}: {}", i, key);
    }
    println!("   Next bookkeeper address: {}", ledger.next_miner_address()?);

    println!("\n3. Subscribing to commits...");
    let mut commits = ledger.notifier().subscribe();

    println!("\n4. Splitting the governing supply...");
    let issue = genesis
        .transactions()
        .iter()
        .find(|tx| tx.transaction_type() == TransactionType::Issue)
        .ok_or_else(|| anyhow::anyhow!("genesis has no issue transaction"))?;
    let split = Transaction::contract(
        vec![TransactionInput::new(issue.hash(), 0)],
        vec![governing(60_000_000)?, governing(40_000_000)?],
    );
    commit(&ledger, vec![split.clone()])?;
    println!("   Committed split {}", split.hash());

    println!("\n5. Enrolling a candidate and voting for it...");
    let candidate = candidate_key()?;
    let enroll = Transaction::enrollment(
        candidate,
        vec![TransactionInput::new(split.hash(), 1)],
        vec![governing(40_000_000)?],
    );
    let vote = Transaction::voting(
        vec![enroll.hash()],
        vec![TransactionInput::new(split.hash(), 0)],
        vec![governing(60_000_000)?],
    );
    let block = commit(&ledger, vec![enroll, vote])?;
    println!("   Committed block #{} {}", block.height(), block.hash());
    println!("   Cache epoch: {}", ledger.cache_epoch());

    println!("\n6. Elected bookkeepers...");
    for (i, key) in ledger.get_miners()?.iter().enumerate() {
        let marker = if *key == candidate { " (candidate)" } else { "" };
        println!("   #{}: {}{}", i, key, marker);
    }
    println!("   Next bookkeeper address: {}", ledger.next_miner_address()?);

    println!("\n7. Commit notifications...");
    while let Ok(block) = commits.try_recv() {
        println!("   Persisted block #{} {}", block.height(), block.hash());
    }

    println!("\n8. Calculating the bonus for the spent genesis output...");
    let claim = TransactionInput::new(issue.hash(), 0);
    let unclaimed = ledger.get_unclaimed(&issue.hash())?;
    if let Some(claimable) = unclaimed.get(&0) {
        println!(
            "   Output held from #{} to #{}",
            claimable.start_height, claimable.end_height
        );
    }
    println!("   Bonus: {}", ledger.calculate_bonus(&[claim])?);

    println!("\n9. Registering the default ledger...");
    let registry = LedgerRegistry::new();
    registry.register(Arc::clone(&ledger))?;
    let replacement = Arc::new(Ledger::new(
        Arc::new(MemoryBlockchain::new()),
        ConsensusConfig::default(),
    )?);
    registry.register(replacement)?;
    println!("   Previous ledger disposed: {}", ledger.is_disposed());
    if let Some(current) = registry.current() {
        println!("   Default ledger height: {}", current.height());
    }

    println!("\nDemo completed.");
    Ok(())
}
