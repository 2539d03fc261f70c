//! Ledger handle
//!
//! Wraps a backend with the bookkeeper election cache, commit notification
//! and transaction verification. The handle is itself a [`Blockchain`], so
//! consumers hold an `Arc<Ledger>` and never touch the backend directly.

use crate::notify::PersistNotifier;
use crate::verify::TransactionVerifier;
use crate::{Blockchain, BlockchainAbility, LedgerError, LedgerResult};
use chain_consensus::{elect_miners, election, ConsensusConfig};
use chain_core::{
    governing_token, utility_token, Block, BlockHeight, Claimable, Enrollment, Fixed8, Hash160,
    Hash256, Header, PublicKey, Transaction, TransactionInput, TransactionOutput,
    TransactionType, Vote, FIXED8_ONE,
};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Indexes bookkeeper election reads
pub const ELECTION_ABILITY: BlockchainAbility =
    BlockchainAbility::TRANSACTION_INDEXES.union(BlockchainAbility::UNSPENT_INDEXES);

/// Ledger handle over a backend
pub struct Ledger {
    backend: Arc<dyn Blockchain>,
    config: ConsensusConfig,
    standby: Vec<PublicKey>,
    /// Bookkeepers for the current head, rebuilt on demand
    miners: Mutex<Option<Vec<PublicKey>>>,
    cache_epoch: AtomicU64,
    notifier: Arc<PersistNotifier>,
    verifier: Option<Arc<dyn TransactionVerifier>>,
    disposed: AtomicBool,
}

impl Ledger {
    /// Open a ledger over `backend`
    pub fn new(backend: Arc<dyn Blockchain>, config: ConsensusConfig) -> LedgerResult<Self> {
        config.validate()?;
        let standby = config.standby_keys()?;
        info!(
            "Opened ledger at height {} with abilities {}",
            backend.height(),
            backend.ability()
        );
        Ok(Self {
            backend,
            config,
            standby,
            miners: Mutex::new(None),
            cache_epoch: AtomicU64::new(0),
            notifier: Arc::new(PersistNotifier::new()),
            verifier: None,
            disposed: AtomicBool::new(false),
        })
    }

    /// Attach the witness verifier used by [`verify_transaction`](Self::verify_transaction)
    pub fn with_verifier(mut self, verifier: Arc<dyn TransactionVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn backend(&self) -> &Arc<dyn Blockchain> {
        &self.backend
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Commit notifications
    pub fn notifier(&self) -> &Arc<PersistNotifier> {
        &self.notifier
    }

    pub fn standby_miners(&self) -> &[PublicKey] {
        &self.standby
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Number of times the bookkeeper cache has been invalidated
    pub fn cache_epoch(&self) -> u64 {
        self.cache_epoch.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> LedgerResult<()> {
        if self.is_disposed() {
            return Err(LedgerError::Disposed);
        }
        Ok(())
    }

    /// Bookkeepers for the block after the current head
    pub fn get_miners(&self) -> LedgerResult<Vec<PublicKey>> {
        let mut cache = self.miners.lock();
        if let Some(miners) = cache.as_ref() {
            return Ok(miners.clone());
        }
        let miners = self.get_miners_with(&[])?;
        debug!("Recomputed {} bookkeepers at height {}", miners.len(), self.backend.height());
        *cache = Some(miners.clone());
        Ok(miners)
    }

    /// Bookkeepers as if `others` were also committed. Never cached.
    pub fn get_miners_with(&self, others: &[Transaction]) -> LedgerResult<Vec<PublicKey>> {
        self.backend.ability().require("get_miners", ELECTION_ABILITY)?;
        let votes = self.backend.get_votes(others)?;
        let enrollments = self.backend.get_enrollments(others)?;
        Ok(elect_miners(&votes, &enrollments, &self.standby))
    }

    /// Multi-signature address of `miners`
    pub fn get_miner_address(miners: &[PublicKey]) -> LedgerResult<Hash160> {
        Ok(election::get_miner_address(miners)?)
    }

    /// Address that must sign the next block
    pub fn next_miner_address(&self) -> LedgerResult<Hash160> {
        Self::get_miner_address(&self.get_miners()?)
    }

    /// Utility tokens claimable for the spent governing-token outputs in
    /// `claims`: generation plus system fees over each output's holding
    /// period, pro rata to its share of the governing supply.
    pub fn calculate_bonus(&self, claims: &[TransactionInput]) -> LedgerResult<Fixed8> {
        let supply = governing_token()
            .registration()
            .map(|asset| asset.amount.raw())
            .filter(|amount| *amount > 0)
            .ok_or_else(|| {
                LedgerError::InvalidArgument("governing token has no fixed supply".to_string())
            })?;

        let mut unclaimed: HashMap<Hash256, BTreeMap<u16, Claimable>> = HashMap::new();
        let mut seen = HashSet::new();
        let mut total = 0i128;
        for claim in claims {
            if !seen.insert(*claim) {
                return Err(LedgerError::InvalidArgument(format!(
                    "output {}:{} is claimed twice",
                    claim.prev_hash, claim.prev_index
                )));
            }
            let outputs = match unclaimed.entry(claim.prev_hash) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(self.backend.get_unclaimed(&claim.prev_hash)?),
            };
            let claimable = outputs.get(&claim.prev_index).ok_or_else(|| {
                LedgerError::InvalidArgument(format!(
                    "output {}:{} is not claimable",
                    claim.prev_hash, claim.prev_index
                ))
            })?;
            total += self.bonus_of(claimable, supply)?;
        }

        i64::try_from(total)
            .map(Fixed8::from_raw)
            .map_err(|_| LedgerError::Overflow("claim bonus".to_string()))
    }

    fn bonus_of(&self, claimable: &Claimable, supply: i64) -> LedgerResult<i128> {
        let (start, end) = (claimable.start_height, claimable.end_height);
        if end <= start {
            return Ok(0);
        }
        let generated = i128::from(self.config.generated_between(start, end)) * i128::from(FIXED8_ONE);
        let fees_before = match start {
            0 => 0,
            _ => self.sys_fee_at(start - 1)?,
        };
        let fees = self.sys_fee_at(end - 1)? - fees_before;
        Ok(i128::from(claimable.output.value.raw()) * (generated + fees) / i128::from(supply))
    }

    fn sys_fee_at(&self, height: BlockHeight) -> LedgerResult<i128> {
        Ok(self
            .backend
            .get_sys_fee_amount_by_height(height)?
            .map(|fee| i128::from(fee.raw()))
            .unwrap_or(0))
    }

    /// State checks for a candidate transaction, followed by the witness
    /// verifier if one is attached. The utility tokens a transaction
    /// consumes beyond what it outputs must cover its system fee.
    pub fn verify_transaction(&self, tx: &Transaction) -> LedgerResult<bool> {
        if self.backend.is_double_spend(tx)? {
            debug!("Transaction {} fails: double spend", tx.hash());
            return Ok(false);
        }

        let fee = i128::from(tx.system_fee().raw());
        if fee > 0 {
            let paid = -self.minted(tx, &utility_token().hash())?;
            if paid < fee {
                debug!(
                    "Transaction {} pays {} of its {} system fee",
                    tx.hash(),
                    paid,
                    fee
                );
                return Ok(false);
            }
        }

        if tx.transaction_type() == TransactionType::Claim {
            if tx.claims().is_empty() {
                return Ok(false);
            }
            let bonus = i128::from(self.calculate_bonus(tx.claims())?.raw());
            let minted = self.minted(tx, &utility_token().hash())?;
            if minted > bonus {
                debug!(
                    "Claim {} mints {} but only {} is claimable",
                    tx.hash(),
                    minted,
                    bonus
                );
                return Ok(false);
            }
        }

        match &self.verifier {
            Some(verifier) => verifier.verify(tx),
            None => Ok(true),
        }
    }

    /// Raw amount of `asset` created by `tx` beyond what its inputs supply
    fn minted(&self, tx: &Transaction, asset: &Hash256) -> LedgerResult<i128> {
        let created: i128 = tx
            .outputs()
            .iter()
            .filter(|output| output.asset_id == *asset)
            .map(|output| i128::from(output.value.raw()))
            .sum();
        let mut consumed = 0i128;
        for input in tx.inputs() {
            if let Some(output) = self.backend.get_unspent(&input.prev_hash, input.prev_index)? {
                if output.asset_id == *asset {
                    consumed += i128::from(output.value.raw());
                }
            }
        }
        Ok(created - consumed)
    }

    /// Check that `block` is a valid successor of the current head: it
    /// links to it, its merkle root matches, no output is spent twice,
    /// every transaction verifies and it names the right next bookkeepers
    pub fn verify_block(&self, block: &Block) -> LedgerResult<bool> {
        let expected = self.backend.height().checked_add(1);
        if block.header().prev_hash() != self.backend.current_block_hash()
            || Some(block.height()) != expected
        {
            debug!("Block #{} does not extend the current head", block.height());
            return Ok(false);
        }
        if !block.verify_merkle_root() {
            debug!("Block #{} has a wrong merkle root", block.height());
            return Ok(false);
        }

        let mut spending = HashSet::new();
        let mut claiming = HashSet::new();
        for tx in block.transactions() {
            let spends_twice = tx.inputs().iter().any(|input| !spending.insert(*input));
            let claims_twice = tx.claims().iter().any(|claim| !claiming.insert(*claim));
            if spends_twice || claims_twice {
                debug!("Block #{} spends an output twice", block.height());
                return Ok(false);
            }
        }

        for tx in block.transactions() {
            if !self.verify_transaction(tx)? {
                return Ok(false);
            }
        }

        let miners = self.get_miners_with(block.transactions())?;
        if block.header().next_miner() != Self::get_miner_address(&miners)? {
            debug!("Block #{} names the wrong next bookkeepers", block.height());
            return Ok(false);
        }
        Ok(true)
    }

    fn on_persist(&self, block: &Block) {
        *self.miners.lock() = None;
        self.cache_epoch.fetch_add(1, Ordering::SeqCst);
        self.notifier.notify(block);
    }
}

impl Blockchain for Ledger {
    fn ability(&self) -> BlockchainAbility {
        self.backend.ability()
    }

    fn is_read_only(&self) -> bool {
        self.backend.is_read_only()
    }

    fn current_block_hash(&self) -> Hash256 {
        self.backend.current_block_hash()
    }

    fn current_header_hash(&self) -> Hash256 {
        self.backend.current_header_hash()
    }

    fn height(&self) -> BlockHeight {
        self.backend.height()
    }

    fn header_height(&self) -> BlockHeight {
        self.backend.header_height()
    }

    fn leaf_header_hashes(&self) -> Vec<Hash256> {
        self.backend.leaf_header_hashes()
    }

    /// Commit `block`, then invalidate the bookkeeper cache and notify
    /// observers before returning
    fn add_block(&self, block: &Block) -> LedgerResult<bool> {
        self.ensure_open()?;
        if !self.backend.add_block(block)? {
            return Ok(false);
        }
        self.on_persist(block);
        Ok(true)
    }

    fn add_headers(&self, headers: &[Header]) -> LedgerResult<()> {
        self.ensure_open()?;
        self.backend.add_headers(headers)
    }

    /// Idempotent; the backend is disposed at most once
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.miners.lock() = None;
        self.backend.dispose();
        info!("Disposed ledger at height {}", self.backend.height());
    }

    fn get_block_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>> {
        self.backend.get_block_hash(height)
    }

    fn get_header_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>> {
        self.backend.get_header_hash(height)
    }

    fn get_block(&self, hash: &Hash256) -> LedgerResult<Option<Block>> {
        self.backend.get_block(hash)
    }

    fn get_block_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Block>> {
        self.backend.get_block_by_height(height)
    }

    fn get_header(&self, hash: &Hash256) -> LedgerResult<Option<Header>> {
        self.backend.get_header(hash)
    }

    fn get_header_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Header>> {
        self.backend.get_header_by_height(height)
    }

    fn get_next_block_hash(&self, hash: &Hash256) -> LedgerResult<Option<Hash256>> {
        self.backend.get_next_block_hash(hash)
    }

    fn get_next_block(&self, hash: &Hash256) -> LedgerResult<Option<Block>> {
        self.backend.get_next_block(hash)
    }

    fn contains_block(&self, hash: &Hash256) -> LedgerResult<bool> {
        self.backend.contains_block(hash)
    }

    fn get_transaction_with_height(
        &self,
        hash: &Hash256,
    ) -> LedgerResult<Option<(Transaction, BlockHeight)>> {
        self.backend.get_transaction_with_height(hash)
    }

    fn get_transaction(&self, hash: &Hash256) -> LedgerResult<Option<Transaction>> {
        self.backend.get_transaction(hash)
    }

    fn contains_transaction(&self, hash: &Hash256) -> LedgerResult<bool> {
        self.backend.contains_transaction(hash)
    }

    fn get_assets(&self) -> LedgerResult<Vec<Transaction>> {
        self.backend.get_assets()
    }

    fn contains_asset(&self, hash: &Hash256) -> LedgerResult<bool> {
        self.backend.contains_asset(hash)
    }

    fn get_quantity_issued(&self, asset_id: &Hash256) -> LedgerResult<Fixed8> {
        self.backend.get_quantity_issued(asset_id)
    }

    fn get_sys_fee_amount(&self, hash: &Hash256) -> LedgerResult<Option<Fixed8>> {
        self.backend.get_sys_fee_amount(hash)
    }

    fn get_sys_fee_amount_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Fixed8>> {
        self.backend.get_sys_fee_amount_by_height(height)
    }

    fn get_unclaimed(&self, hash: &Hash256) -> LedgerResult<BTreeMap<u16, Claimable>> {
        self.backend.get_unclaimed(hash)
    }

    fn get_unspent(&self, hash: &Hash256, index: u16) -> LedgerResult<Option<TransactionOutput>> {
        self.backend.get_unspent(hash, index)
    }

    fn contains_unspent(&self, hash: &Hash256, index: u16) -> LedgerResult<bool> {
        self.backend.contains_unspent(hash, index)
    }

    fn get_enrollments(&self, others: &[Transaction]) -> LedgerResult<Vec<Enrollment>> {
        self.backend.get_enrollments(others)
    }

    fn get_votes(&self, others: &[Transaction]) -> LedgerResult<Vec<Vote>> {
        self.backend.get_votes(others)
    }

    fn is_double_spend(&self, tx: &Transaction) -> LedgerResult<bool> {
        self.backend.is_double_spend(tx)
    }
}

impl Drop for Ledger {
    fn drop(&mut self) {
        if !self.is_disposed() {
            debug!("Ledger dropped without dispose, disposing now");
            Blockchain::dispose(self);
        }
    }
}
