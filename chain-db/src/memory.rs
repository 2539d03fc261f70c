//! In-memory ledger backend
//!
//! Maintains every index the ledger contract can ask for. All state sits
//! behind a single lock and a block is validated and applied while holding
//! it, so readers see either none or all of a block's effects.

use crate::header_chain::HeaderChain;
use crate::{Blockchain, BlockchainAbility, LedgerError, LedgerResult};
use chain_core::{
    genesis_block, governing_token, Block, BlockHeight, Claimable, Enrollment, Fixed8, Hash256,
    Header, Transaction, TransactionInput, TransactionOutput, TransactionType, Vote,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

const INDEXED: BlockchainAbility = BlockchainAbility::TRANSACTION_INDEXES.union(BlockchainAbility::UNSPENT_INDEXES);

/// Ledger backend holding the whole chain in memory
pub struct MemoryBlockchain {
    state: RwLock<ChainState>,
    ability: BlockchainAbility,
    disposed: AtomicBool,
}

impl MemoryBlockchain {
    /// Backend with every index, holding only the genesis block
    pub fn new() -> Self {
        Self::with_ability(BlockchainAbility::ALL)
    }

    /// Backend that exposes only the `ability` indexes to callers
    pub fn with_ability(ability: BlockchainAbility) -> Self {
        Self {
            state: RwLock::new(ChainState::new()),
            ability,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> LedgerResult<()> {
        if self.is_disposed() {
            return Err(LedgerError::Disposed);
        }
        Ok(())
    }
}

impl Default for MemoryBlockchain {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics a validated block adds. Raw amounts are summed in `i128`
/// and range-checked before the block is applied.
#[derive(Debug, Default)]
struct BlockEffects {
    issued: BTreeMap<Hash256, i128>,
    sys_fee: i128,
}

struct ChainState {
    block_hashes: Vec<Hash256>,
    blocks: HashMap<Hash256, Block>,
    headers: HeaderChain,
    transactions: HashMap<Hash256, (Transaction, BlockHeight)>,
    /// Spent outputs and the height of the block that spent them
    spent: HashMap<TransactionInput, BlockHeight>,
    claimed: HashSet<TransactionInput>,
    issued: HashMap<Hash256, Fixed8>,
    /// Cumulative system fee by height
    sys_fees: Vec<Fixed8>,
    assets: Vec<Hash256>,
    enrollments: Vec<Hash256>,
    votes: Vec<Hash256>,
}

impl ChainState {
    fn new() -> Self {
        let genesis = genesis_block();
        let mut state = Self {
            block_hashes: Vec::new(),
            blocks: HashMap::new(),
            headers: HeaderChain::new(genesis.header().clone()),
            transactions: HashMap::new(),
            spent: HashMap::new(),
            claimed: HashSet::new(),
            issued: HashMap::new(),
            sys_fees: Vec::new(),
            assets: Vec::new(),
            enrollments: Vec::new(),
            votes: Vec::new(),
        };
        let effects = state.effects(genesis);
        state.apply(genesis, effects);
        state
    }

    fn height(&self) -> BlockHeight {
        (self.block_hashes.len() - 1) as BlockHeight
    }

    fn current_hash(&self) -> Hash256 {
        self.block_hashes[self.block_hashes.len() - 1]
    }

    fn output(&self, input: &TransactionInput) -> Option<&TransactionOutput> {
        self.transactions
            .get(&input.prev_hash)
            .and_then(|(tx, _)| tx.outputs().get(input.prev_index as usize))
    }

    fn is_unspent(&self, input: &TransactionInput) -> bool {
        self.output(input).is_some() && !self.spent.contains_key(input)
    }

    fn is_unclaimed(&self, input: &TransactionInput) -> bool {
        let governing = governing_token().hash();
        self.output(input)
            .is_some_and(|output| output.asset_id == governing)
            && self.spent.contains_key(input)
            && !self.claimed.contains(input)
    }

    /// Check that `tx` spends and claims only what is available, counting
    /// everything already recorded in `spending` and `claiming`
    fn check_spends(
        &self,
        tx: &Transaction,
        spending: &mut HashSet<TransactionInput>,
        claiming: &mut HashSet<TransactionInput>,
    ) -> Result<(), String> {
        for input in tx.inputs() {
            if !spending.insert(*input) {
                return Err(format!(
                    "output {}:{} is spent twice",
                    input.prev_hash, input.prev_index
                ));
            }
            if !self.is_unspent(input) {
                return Err(format!(
                    "output {}:{} is spent or unknown",
                    input.prev_hash, input.prev_index
                ));
            }
        }
        for claim in tx.claims() {
            if !claiming.insert(*claim) {
                return Err(format!(
                    "output {}:{} is claimed twice",
                    claim.prev_hash, claim.prev_index
                ));
            }
            if !self.is_unclaimed(claim) {
                return Err(format!(
                    "output {}:{} is not claimable",
                    claim.prev_hash, claim.prev_index
                ));
            }
        }
        Ok(())
    }

    /// Issuance and fees of `block`, with inputs resolved against
    /// committed outputs
    fn effects(&self, block: &Block) -> BlockEffects {
        let mut effects = BlockEffects::default();
        for tx in block.transactions() {
            let mut balance: BTreeMap<Hash256, i128> = BTreeMap::new();
            for output in tx.outputs() {
                *balance.entry(output.asset_id).or_insert(0) += i128::from(output.value.raw());
            }
            for output in tx.inputs().iter().filter_map(|input| self.output(input)) {
                *balance.entry(output.asset_id).or_insert(0) -= i128::from(output.value.raw());
            }
            for (asset, delta) in balance.into_iter().filter(|(_, delta)| *delta > 0) {
                *effects.issued.entry(asset).or_insert(0) += delta;
            }
            effects.sys_fee += i128::from(tx.system_fee().raw());
        }
        effects
    }

    /// Full successor check of `block`. Returns the reason on rejection.
    fn validate(&self, block: &Block) -> Result<BlockEffects, String> {
        let expected = self.height() + 1;
        if block.header().prev_hash() != self.current_hash() || block.height() != expected {
            return Err(format!(
                "does not extend #{} {}",
                self.height(),
                self.current_hash()
            ));
        }
        if !block.verify_merkle_root() {
            return Err("merkle root mismatch".to_string());
        }

        let mut hashes = HashSet::new();
        let mut spending = HashSet::new();
        let mut claiming = HashSet::new();
        let mut registered: HashMap<Hash256, Fixed8> = HashMap::new();
        for tx in block.transactions() {
            let hash = tx.hash();
            if !hashes.insert(hash) || self.transactions.contains_key(&hash) {
                return Err(format!("duplicate transaction {}", hash));
            }
            if tx.outputs().iter().any(|output| output.value.raw() <= 0) {
                return Err(format!("transaction {} has a non-positive output", hash));
            }
            self.check_spends(tx, &mut spending, &mut claiming)?;
            if let Some(asset) = tx.registration() {
                registered.insert(hash, asset.amount);
            }
        }

        let effects = self.effects(block);
        for (asset, delta) in &effects.issued {
            let limit = match registered.get(asset) {
                Some(amount) => *amount,
                None => self
                    .transactions
                    .get(asset)
                    .and_then(|(tx, _)| tx.registration())
                    .map(|registration| registration.amount)
                    .ok_or_else(|| format!("issues unregistered asset {}", asset))?,
            };
            let current = self.issued.get(asset).copied().unwrap_or(Fixed8::ZERO);
            let total = i128::from(current.raw()) + delta;
            // a negative registered amount means unlimited issuance
            if total > i128::from(i64::MAX) || (!limit.is_negative() && total > i128::from(limit.raw())) {
                return Err(format!("issuance of {} exceeds its registered amount", asset));
            }
        }

        let previous = self.sys_fees.last().copied().unwrap_or(Fixed8::ZERO);
        if i128::from(previous.raw()) + effects.sys_fee > i128::from(i64::MAX) {
            return Err("system fee total overflows".to_string());
        }

        Ok(effects)
    }

    fn apply(&mut self, block: &Block, effects: BlockEffects) {
        let height = block.height();
        for tx in block.transactions() {
            let hash = tx.hash();
            for input in tx.inputs() {
                self.spent.insert(*input, height);
            }
            for claim in tx.claims() {
                self.claimed.insert(*claim);
            }
            match tx.transaction_type() {
                TransactionType::Register => self.assets.push(hash),
                TransactionType::Enrollment => self.enrollments.push(hash),
                TransactionType::Voting => self.votes.push(hash),
                _ => {}
            }
            self.transactions.insert(hash, (tx.clone(), height));
        }

        for (asset, delta) in effects.issued {
            let entry = self.issued.entry(asset).or_insert(Fixed8::ZERO);
            *entry = clamp_fixed8(i128::from(entry.raw()) + delta);
        }
        let previous = self.sys_fees.last().copied().unwrap_or(Fixed8::ZERO);
        self.sys_fees
            .push(clamp_fixed8(i128::from(previous.raw()) + effects.sys_fee));

        let hash = block.hash();
        self.block_hashes.push(hash);
        self.blocks.insert(hash, block.clone());
        self.headers.accept_block_header(block.header());
    }

    /// Unspent governing-token stake held by `tx`'s outputs
    fn stake(&self, tx: &Transaction, committed: bool, consumed: &HashSet<TransactionInput>) -> i128 {
        let governing = governing_token().hash();
        indexed_outputs(tx)
            .filter(|(_, output)| output.asset_id == governing)
            .filter(|(index, _)| {
                let input = TransactionInput::new(tx.hash(), *index);
                !consumed.contains(&input) && (!committed || self.is_unspent(&input))
            })
            .map(|(_, output)| i128::from(output.value.raw()))
            .sum()
    }
}

fn indexed_outputs(tx: &Transaction) -> impl Iterator<Item = (u16, &TransactionOutput)> {
    tx.outputs()
        .iter()
        .enumerate()
        .filter_map(|(i, output)| u16::try_from(i).ok().map(|i| (i, output)))
}

fn clamp_fixed8(raw: i128) -> Fixed8 {
    Fixed8::from_raw(raw.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
}

fn consumed_by(others: &[Transaction]) -> HashSet<TransactionInput> {
    others
        .iter()
        .flat_map(|tx| tx.inputs().iter().copied())
        .collect()
}

fn vote_of(tx: &Transaction, stake: i128) -> LedgerResult<Option<Vote>> {
    let enrollments = match tx.voted_enrollments() {
        Some(enrollments) if stake > 0 => enrollments.to_vec(),
        _ => return Ok(None),
    };
    let count = i64::try_from(stake)
        .map_err(|_| LedgerError::Overflow(format!("stake of vote {}", tx.hash())))?;
    Ok(Some(Vote::new(enrollments, Fixed8::from_raw(count))))
}

impl Blockchain for MemoryBlockchain {
    fn ability(&self) -> BlockchainAbility {
        self.ability
    }

    fn current_block_hash(&self) -> Hash256 {
        self.state.read().current_hash()
    }

    fn current_header_hash(&self) -> Hash256 {
        self.state.read().headers.tip_hash()
    }

    fn height(&self) -> BlockHeight {
        self.state.read().height()
    }

    fn header_height(&self) -> BlockHeight {
        self.state.read().headers.height()
    }

    fn leaf_header_hashes(&self) -> Vec<Hash256> {
        self.state.read().headers.leaf_hashes()
    }

    fn add_block(&self, block: &Block) -> LedgerResult<bool> {
        self.ensure_open()?;
        let mut state = self.state.write();
        let effects = match state.validate(block) {
            Ok(effects) => effects,
            Err(reason) => {
                warn!("Rejected block #{} {}: {}", block.height(), block.hash(), reason);
                return Ok(false);
            }
        };
        state.apply(block, effects);
        info!(
            "Persisted block #{} {} with {} transactions",
            block.height(),
            block.hash(),
            block.transactions().len()
        );
        Ok(true)
    }

    fn add_headers(&self, headers: &[Header]) -> LedgerResult<()> {
        self.ensure_open()?;
        let mut state = self.state.write();
        let added = state.headers.add_headers(headers);
        debug!(
            "Appended {} of {} headers, header height {}",
            added,
            headers.len(),
            state.headers.height()
        );
        Ok(())
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            debug!("Disposed in-memory backend at height {}", self.height());
        }
    }

    fn get_block_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>> {
        Ok(self.state.read().block_hashes.get(height as usize).copied())
    }

    fn get_header_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>> {
        Ok(self.state.read().headers.hash_at(height))
    }

    fn get_block(&self, hash: &Hash256) -> LedgerResult<Option<Block>> {
        Ok(self.state.read().blocks.get(hash).cloned())
    }

    fn get_header(&self, hash: &Hash256) -> LedgerResult<Option<Header>> {
        Ok(self.state.read().headers.get(hash).cloned())
    }

    fn contains_block(&self, hash: &Hash256) -> LedgerResult<bool> {
        Ok(self.state.read().blocks.contains_key(hash))
    }

    fn get_transaction_with_height(
        &self,
        hash: &Hash256,
    ) -> LedgerResult<Option<(Transaction, BlockHeight)>> {
        self.ability
            .require("get_transaction", BlockchainAbility::TRANSACTION_INDEXES)?;
        Ok(self.state.read().transactions.get(hash).cloned())
    }

    fn get_assets(&self) -> LedgerResult<Vec<Transaction>> {
        self.ability
            .require("get_assets", BlockchainAbility::TRANSACTION_INDEXES)?;
        let state = self.state.read();
        Ok(state
            .assets
            .iter()
            .filter_map(|hash| state.transactions.get(hash).map(|(tx, _)| tx.clone()))
            .collect())
    }

    fn get_quantity_issued(&self, asset_id: &Hash256) -> LedgerResult<Fixed8> {
        self.ability
            .require("get_quantity_issued", BlockchainAbility::STATISTICS)?;
        Ok(self
            .state
            .read()
            .issued
            .get(asset_id)
            .copied()
            .unwrap_or(Fixed8::ZERO))
    }

    fn get_sys_fee_amount(&self, hash: &Hash256) -> LedgerResult<Option<Fixed8>> {
        self.ability
            .require("get_sys_fee_amount", BlockchainAbility::STATISTICS)?;
        let state = self.state.read();
        Ok(state
            .blocks
            .get(hash)
            .and_then(|block| state.sys_fees.get(block.height() as usize))
            .copied())
    }

    fn get_unclaimed(&self, hash: &Hash256) -> LedgerResult<BTreeMap<u16, Claimable>> {
        self.ability.require("get_unclaimed", INDEXED)?;
        let state = self.state.read();
        let (tx, start_height) = match state.transactions.get(hash) {
            Some(entry) => entry,
            None => return Ok(BTreeMap::new()),
        };
        Ok(indexed_outputs(tx)
            .filter_map(|(index, output)| {
                let input = TransactionInput::new(*hash, index);
                if !state.is_unclaimed(&input) {
                    return None;
                }
                let end_height = *state.spent.get(&input)?;
                Some((
                    index,
                    Claimable {
                        output: *output,
                        start_height: *start_height,
                        end_height,
                    },
                ))
            })
            .collect())
    }

    fn get_unspent(&self, hash: &Hash256, index: u16) -> LedgerResult<Option<TransactionOutput>> {
        self.ability
            .require("get_unspent", BlockchainAbility::UNSPENT_INDEXES)?;
        let state = self.state.read();
        let input = TransactionInput::new(*hash, index);
        if state.spent.contains_key(&input) {
            return Ok(None);
        }
        Ok(state.output(&input).copied())
    }

    fn get_enrollments(&self, others: &[Transaction]) -> LedgerResult<Vec<Enrollment>> {
        self.ability.require("get_enrollments", INDEXED)?;
        let state = self.state.read();
        let consumed = consumed_by(others);

        let committed = state.enrollments.iter().filter_map(|hash| {
            let deposit = TransactionInput::new(*hash, 0);
            if !state.is_unspent(&deposit) || consumed.contains(&deposit) {
                return None;
            }
            let (tx, _) = state.transactions.get(hash)?;
            tx.enrolled_key().map(|key| Enrollment {
                hash: *hash,
                public_key: *key,
            })
        });
        let pending = others.iter().filter_map(|tx| {
            let deposit = TransactionInput::new(tx.hash(), 0);
            if tx.outputs().is_empty() || consumed.contains(&deposit) {
                return None;
            }
            tx.enrolled_key().map(|key| Enrollment {
                hash: tx.hash(),
                public_key: *key,
            })
        });
        Ok(committed.chain(pending).collect())
    }

    fn get_votes(&self, others: &[Transaction]) -> LedgerResult<Vec<Vote>> {
        self.ability.require("get_votes", INDEXED)?;
        let state = self.state.read();
        let consumed = consumed_by(others);

        let mut votes = Vec::new();
        for hash in &state.votes {
            if let Some((tx, _)) = state.transactions.get(hash) {
                votes.extend(vote_of(tx, state.stake(tx, true, &consumed))?);
            }
        }
        for tx in others {
            votes.extend(vote_of(tx, state.stake(tx, false, &consumed))?);
        }
        Ok(votes)
    }

    fn is_double_spend(&self, tx: &Transaction) -> LedgerResult<bool> {
        self.ability
            .require("is_double_spend", BlockchainAbility::UNSPENT_INDEXES)?;
        let state = self.state.read();
        let result = state.check_spends(tx, &mut HashSet::new(), &mut HashSet::new());
        if let Err(reason) = &result {
            debug!("Transaction {} double spends: {}", tx.hash(), reason);
        }
        Ok(result.is_err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{utility_token, Hash160, PublicKey, TransactionPayload};

    fn issue_output() -> (TransactionInput, TransactionOutput) {
        let issue = genesis_block()
            .transactions()
            .iter()
            .find(|tx| tx.transaction_type() == TransactionType::Issue)
            .unwrap();
        (TransactionInput::new(issue.hash(), 0), issue.outputs()[0])
    }

    fn next_block(chain: &MemoryBlockchain, transactions: Vec<Transaction>) -> Block {
        let prev = chain.get_block(&chain.current_block_hash()).unwrap().unwrap();
        Block::new(
            0,
            prev.hash(),
            prev.header().timestamp() + 15,
            prev.height() + 1,
            u64::from(prev.height()) + 1,
            Hash160::zero(),
            transactions,
        )
    }

    fn split_tx(input: TransactionInput, asset: Hash256, parts: &[i64]) -> Transaction {
        let outputs = parts
            .iter()
            .map(|units| TransactionOutput::new(asset, Fixed8::from_units(*units).unwrap(), Hash160::zero()))
            .collect();
        Transaction::contract(vec![input], outputs)
    }

    fn key(seed: u8) -> PublicKey {
        let mut bytes = [seed; 33];
        bytes[0] = 0x03;
        (0..=u8::MAX)
            .find_map(|tweak| {
                bytes[32] = tweak;
                PublicKey::decode(&bytes).ok()
            })
            .unwrap()
    }

    #[test]
    fn test_genesis_present() {
        let chain = MemoryBlockchain::new();
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.current_block_hash(), genesis_block().hash());
        assert_eq!(chain.get_block_by_height(0).unwrap().unwrap(), *genesis_block());
        assert!(chain.contains_asset(&governing_token().hash()).unwrap());
        assert!(chain.contains_asset(&utility_token().hash()).unwrap());
        assert_eq!(chain.get_assets().unwrap().len(), 2);

        let (tx, height) = chain
            .get_transaction_with_height(&governing_token().hash())
            .unwrap()
            .unwrap();
        assert_eq!(height, 0);
        assert_eq!(tx, *governing_token());
    }

    #[test]
    fn test_genesis_statistics() {
        let chain = MemoryBlockchain::new();
        let supply = governing_token().registration().unwrap().amount;
        assert_eq!(chain.get_quantity_issued(&governing_token().hash()).unwrap(), supply);
        assert_eq!(chain.get_quantity_issued(&utility_token().hash()).unwrap(), Fixed8::ZERO);
        assert_eq!(chain.get_sys_fee_amount_by_height(0).unwrap(), Some(Fixed8::ZERO));
        assert_eq!(chain.get_sys_fee_amount_by_height(1).unwrap(), None);
    }

    #[test]
    fn test_spend_and_double_spend() {
        let chain = MemoryBlockchain::new();
        let (input, output) = issue_output();
        assert!(chain.contains_unspent_input(&input).unwrap());

        let tx = split_tx(input, output.asset_id, &[60_000_000, 40_000_000]);
        assert!(!chain.is_double_spend(&tx).unwrap());
        assert!(chain.add_block(&next_block(&chain, vec![tx.clone()])).unwrap());

        assert!(!chain.contains_unspent_input(&input).unwrap());
        assert!(chain.get_unspent(&tx.hash(), 1).unwrap().is_some());
        assert!(chain.get_unspent(&tx.hash(), 2).unwrap().is_none());

        let again = split_tx(input, output.asset_id, &[100_000_000]);
        assert!(chain.is_double_spend(&again).unwrap());
        assert!(!chain.add_block(&next_block(&chain, vec![again])).unwrap());
        assert_eq!(chain.height(), 1);
    }

    #[test]
    fn test_intra_block_double_spend_rejected() {
        let chain = MemoryBlockchain::new();
        let (input, output) = issue_output();
        let a = split_tx(input, output.asset_id, &[100_000_000]);
        let b = split_tx(input, output.asset_id, &[50_000_000, 50_000_000]);

        let block = next_block(&chain, vec![a, b]);
        assert!(!chain.add_block(&block).unwrap());
        assert_eq!(chain.height(), 0);
        assert!(chain.contains_unspent_input(&input).unwrap());
    }

    #[test]
    fn test_non_successor_rejected() {
        let chain = MemoryBlockchain::new();
        let block = Block::new(0, Hash256::new([1; 32]), 1, 1, 0, Hash160::zero(), Vec::new());
        assert!(!chain.add_block(&block).unwrap());

        let skipped = Block::new(0, genesis_block().hash(), 1, 2, 0, Hash160::zero(), Vec::new());
        assert!(!chain.add_block(&skipped).unwrap());
        assert_eq!(chain.height(), 0);
    }

    #[test]
    fn test_issuance_capped_by_registration() {
        let chain = MemoryBlockchain::new();
        let inflation = Transaction::new(
            TransactionPayload::Issue { nonce: 7 },
            Vec::new(),
            Vec::new(),
            vec![TransactionOutput::new(
                governing_token().hash(),
                Fixed8::SATOSHI,
                Hash160::zero(),
            )],
        );
        assert!(!chain.add_block(&next_block(&chain, vec![inflation])).unwrap());

        let unregistered = Transaction::new(
            TransactionPayload::Issue { nonce: 8 },
            Vec::new(),
            Vec::new(),
            vec![TransactionOutput::new(Hash256::new([5; 32]), Fixed8::SATOSHI, Hash160::zero())],
        );
        assert!(!chain.add_block(&next_block(&chain, vec![unregistered])).unwrap());
    }

    #[test]
    fn test_unclaimed_and_claims() {
        let chain = MemoryBlockchain::new();
        let (input, output) = issue_output();
        let tx = split_tx(input, output.asset_id, &[100_000_000]);
        chain.add_block(&next_block(&chain, vec![tx])).unwrap();

        let unclaimed = chain.get_unclaimed(&input.prev_hash).unwrap();
        assert_eq!(unclaimed.len(), 1);
        let claimable = unclaimed[&0];
        assert_eq!(claimable.start_height, 0);
        assert_eq!(claimable.end_height, 1);
        assert_eq!(claimable.output, output);

        let claim = Transaction::new(
            TransactionPayload::Claim { claims: vec![input] },
            Vec::new(),
            Vec::new(),
            vec![TransactionOutput::new(utility_token().hash(), Fixed8::from_units(8).unwrap(), Hash160::zero())],
        );
        assert!(!chain.is_double_spend(&claim).unwrap());
        assert!(chain.add_block(&next_block(&chain, vec![claim.clone()])).unwrap());
        assert!(chain.get_unclaimed(&input.prev_hash).unwrap().is_empty());
        assert_eq!(
            chain.get_quantity_issued(&utility_token().hash()).unwrap(),
            Fixed8::from_units(8).unwrap()
        );
        assert!(chain.is_double_spend(&claim).unwrap());
    }

    #[test]
    fn test_enrollments_and_votes() {
        let chain = MemoryBlockchain::new();
        let (input, output) = issue_output();
        let split = split_tx(input, output.asset_id, &[30_000_000, 70_000_000]);
        chain.add_block(&next_block(&chain, vec![split.clone()])).unwrap();

        let enroll = Transaction::enrollment(
            key(1),
            vec![TransactionInput::new(split.hash(), 0)],
            vec![TransactionOutput::new(output.asset_id, Fixed8::from_units(30_000_000).unwrap(), Hash160::zero())],
        );
        chain.add_block(&next_block(&chain, vec![enroll.clone()])).unwrap();

        let enrollments = chain.get_enrollments(&[]).unwrap();
        assert_eq!(enrollments, vec![Enrollment { hash: enroll.hash(), public_key: key(1) }]);

        let vote = Transaction::voting(
            vec![enroll.hash()],
            vec![TransactionInput::new(split.hash(), 1)],
            vec![TransactionOutput::new(output.asset_id, Fixed8::from_units(70_000_000).unwrap(), Hash160::zero())],
        );

        // pending vote is visible through `others` only
        assert!(chain.get_votes(&[]).unwrap().is_empty());
        let preview = chain.get_votes(&[vote.clone()]).unwrap();
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].count, Fixed8::from_units(70_000_000).unwrap());

        chain.add_block(&next_block(&chain, vec![vote.clone()])).unwrap();
        let votes = chain.get_votes(&[]).unwrap();
        assert_eq!(votes, vec![Vote::new(vec![enroll.hash()], Fixed8::from_units(70_000_000).unwrap())]);

        // spending the deposit in a pending transaction withdraws the enrollment
        let withdraw = split_tx(TransactionInput::new(enroll.hash(), 0), output.asset_id, &[30_000_000]);
        assert!(chain.get_enrollments(&[withdraw.clone()]).unwrap().is_empty());
        let unvote = split_tx(TransactionInput::new(vote.hash(), 0), output.asset_id, &[70_000_000]);
        assert!(chain.get_votes(&[unvote]).unwrap().is_empty());
    }

    #[test]
    fn test_headers_ahead_of_blocks() {
        let chain = MemoryBlockchain::new();
        let block = next_block(&chain, Vec::new());
        let header2 = Header::new(0, block.hash(), Hash256::zero(), 100, 2, 0, Hash160::zero());

        chain.add_headers(&[block.header().clone(), header2.clone()]).unwrap();
        assert_eq!(chain.header_height(), 2);
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.current_header_hash(), header2.hash());
        assert_eq!(chain.leaf_header_hashes(), vec![header2.hash()]);
        assert_eq!(chain.get_next_block_hash(&genesis_block().hash()).unwrap(), Some(block.hash()));
        assert!(chain.get_next_block(&genesis_block().hash()).unwrap().is_none());

        assert!(chain.add_block(&block).unwrap());
        assert_eq!(chain.header_height(), 2);
        assert_eq!(chain.get_next_block(&genesis_block().hash()).unwrap(), Some(block));
    }

    #[test]
    fn test_missing_ability() {
        let chain = MemoryBlockchain::with_ability(BlockchainAbility::NONE);
        assert!(matches!(
            chain.get_unspent(&Hash256::zero(), 0),
            Err(LedgerError::Unsupported { .. })
        ));
        assert!(matches!(
            chain.get_quantity_issued(&Hash256::zero()),
            Err(LedgerError::Unsupported { .. })
        ));
        // genesis membership never needs an index
        assert!(chain.contains_transaction(&governing_token().hash()).unwrap());
    }

    #[test]
    fn test_dispose() {
        let chain = MemoryBlockchain::new();
        chain.dispose();
        chain.dispose();
        assert!(chain.is_disposed());
        let block = next_block(&chain, Vec::new());
        assert!(matches!(chain.add_block(&block), Err(LedgerError::Disposed)));
    }
}
