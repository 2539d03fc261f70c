//! Chain-building helpers shared by the integration tests

#![allow(dead_code)]

use chain_consensus::ConsensusConfig;
use chain_core::{
    genesis_block, governing_token, Block, Fixed8, Hash160, PublicKey, Transaction,
    TransactionInput, TransactionOutput, TransactionType,
};
use chain_db::{Blockchain, Ledger, MemoryBlockchain};
use std::sync::Arc;

pub fn memory_ledger() -> Arc<Ledger> {
    Arc::new(Ledger::new(Arc::new(MemoryBlockchain::new()), ConsensusConfig::default()).unwrap())
}

/// The genesis output holding the whole governing supply
pub fn issue_input() -> TransactionInput {
    let issue = genesis_block()
        .transactions()
        .iter()
        .find(|tx| tx.transaction_type() == TransactionType::Issue)
        .unwrap();
    TransactionInput::new(issue.hash(), 0)
}

pub fn governing(units: i64) -> TransactionOutput {
    TransactionOutput::new(
        governing_token().hash(),
        Fixed8::from_units(units).unwrap(),
        Hash160::zero(),
    )
}

/// Curve point whose X coordinate starts with `seed`
pub fn key(seed: u16) -> PublicKey {
    let mut bytes = [0x5a; 33];
    bytes[0] = 0x02;
    bytes[1..3].copy_from_slice(&seed.to_be_bytes());
    (0..=u8::MAX)
        .find_map(|tweak| {
            bytes[32] = tweak;
            PublicKey::decode(&bytes).ok()
        })
        .unwrap()
}

/// Successor of the ledger head naming the bookkeepers elected with
/// `transactions` applied
pub fn next_block(ledger: &Ledger, transactions: Vec<Transaction>) -> Block {
    let miners = ledger.get_miners_with(&transactions).unwrap();
    let height = ledger.height() + 1;
    Block::new(
        0,
        ledger.current_block_hash(),
        genesis_block().header().timestamp() + 15 * height,
        height,
        u64::from(height),
        Ledger::get_miner_address(&miners).unwrap(),
        transactions,
    )
}

/// Commit a block of `transactions`, asserting it is accepted
pub fn commit(ledger: &Ledger, transactions: Vec<Transaction>) -> Block {
    let block = next_block(ledger, transactions);
    assert!(ledger.add_block(&block).unwrap(), "block #{} rejected", block.height());
    block
}
