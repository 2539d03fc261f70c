//! The ledger contract every storage backend implements

use crate::{BlockchainAbility, LedgerResult};
use chain_core::{
    genesis_block, governing_token, utility_token, Block, BlockHeight, Claimable, Enrollment,
    Fixed8, Hash256, Header, Transaction, TransactionInput, TransactionOutput, TransactionType,
    Vote,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ledger backend.
///
/// Lookups return `Ok(None)` for unknown references; errors are reserved
/// for missing abilities and storage failures. The genesis block and its
/// two native asset registrations are always present.
pub trait Blockchain: Send + Sync {
    /// Indexes this backend maintains
    fn ability(&self) -> BlockchainAbility;

    /// Whether the backend rejects writes
    fn is_read_only(&self) -> bool {
        false
    }

    /// Hash of the highest block
    fn current_block_hash(&self) -> Hash256;

    /// Hash of the highest known header
    fn current_header_hash(&self) -> Hash256 {
        self.current_block_hash()
    }

    /// Height of the highest block
    fn height(&self) -> BlockHeight;

    /// Height of the highest known header, never below [`height`](Self::height)
    fn header_height(&self) -> BlockHeight {
        self.height()
    }

    /// Tips of the header chain offered to sync peers
    fn leaf_header_hashes(&self) -> Vec<Hash256> {
        vec![self.current_header_hash()]
    }

    /// Append the successor of the current block.
    ///
    /// Returns `Ok(false)` without any change if the block does not link to
    /// the current head or any of its inputs is already spent.
    fn add_block(&self, block: &Block) -> LedgerResult<bool>;

    /// Extend the header chain ahead of the block chain
    fn add_headers(&self, headers: &[Header]) -> LedgerResult<()>;

    /// Release backend resources
    fn dispose(&self) {}

    /// Hash of the block at `height`
    fn get_block_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>>;

    /// Hash of the header at `height`, which may be ahead of the blocks
    fn get_header_hash(&self, height: BlockHeight) -> LedgerResult<Option<Hash256>> {
        self.get_block_hash(height)
    }

    fn get_block(&self, hash: &Hash256) -> LedgerResult<Option<Block>>;

    fn get_block_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Block>> {
        match self.get_block_hash(height)? {
            Some(hash) => self.get_block(&hash),
            None => Ok(None),
        }
    }

    fn get_header(&self, hash: &Hash256) -> LedgerResult<Option<Header>> {
        Ok(self.get_block(hash)?.map(|block| block.header().clone()))
    }

    fn get_header_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Header>> {
        match self.get_header_hash(height)? {
            Some(hash) => self.get_header(&hash),
            None => Ok(None),
        }
    }

    /// Hash of the header that follows `hash`
    fn get_next_block_hash(&self, hash: &Hash256) -> LedgerResult<Option<Hash256>> {
        let header = match self.get_header(hash)? {
            Some(header) => header,
            None => return Ok(None),
        };
        let next_height = match header.height().checked_add(1) {
            Some(height) => height,
            None => return Ok(None),
        };
        self.get_header_hash(next_height)
    }

    /// Block that follows `hash`, if it has been downloaded
    fn get_next_block(&self, hash: &Hash256) -> LedgerResult<Option<Block>> {
        match self.get_next_block_hash(hash)? {
            Some(next) => self.get_block(&next),
            None => Ok(None),
        }
    }

    fn contains_block(&self, hash: &Hash256) -> LedgerResult<bool> {
        if *hash == genesis_block().hash() {
            return Ok(true);
        }
        Ok(self.get_block(hash)?.is_some())
    }

    /// Transaction and the height of the block containing it
    fn get_transaction_with_height(
        &self,
        hash: &Hash256,
    ) -> LedgerResult<Option<(Transaction, BlockHeight)>>;

    fn get_transaction(&self, hash: &Hash256) -> LedgerResult<Option<Transaction>> {
        Ok(self.get_transaction_with_height(hash)?.map(|(tx, _)| tx))
    }

    fn contains_transaction(&self, hash: &Hash256) -> LedgerResult<bool> {
        if genesis_block().get_transaction(hash).is_some() {
            return Ok(true);
        }
        Ok(self.get_transaction_with_height(hash)?.is_some())
    }

    /// Registration transactions of every asset
    fn get_assets(&self) -> LedgerResult<Vec<Transaction>>;

    fn contains_asset(&self, hash: &Hash256) -> LedgerResult<bool> {
        if *hash == governing_token().hash() || *hash == utility_token().hash() {
            return Ok(true);
        }
        Ok(self
            .get_transaction(hash)?
            .is_some_and(|tx| tx.transaction_type() == TransactionType::Register))
    }

    /// Amount of `asset_id` brought into existence by committed transactions
    fn get_quantity_issued(&self, asset_id: &Hash256) -> LedgerResult<Fixed8>;

    /// System fees collected up to and including the block `hash`
    fn get_sys_fee_amount(&self, hash: &Hash256) -> LedgerResult<Option<Fixed8>>;

    fn get_sys_fee_amount_by_height(&self, height: BlockHeight) -> LedgerResult<Option<Fixed8>> {
        match self.get_block_hash(height)? {
            Some(hash) => self.get_sys_fee_amount(&hash),
            None => Ok(None),
        }
    }

    /// Spent, not yet claimed governing-token outputs of `hash` by index
    fn get_unclaimed(&self, hash: &Hash256) -> LedgerResult<BTreeMap<u16, Claimable>>;

    /// Output `index` of `hash` if it exists and is unspent
    fn get_unspent(&self, hash: &Hash256, index: u16) -> LedgerResult<Option<TransactionOutput>>;

    fn contains_unspent(&self, hash: &Hash256, index: u16) -> LedgerResult<bool> {
        Ok(self.get_unspent(hash, index)?.is_some())
    }

    fn contains_unspent_input(&self, input: &TransactionInput) -> LedgerResult<bool> {
        self.contains_unspent(&input.prev_hash, input.prev_index)
    }

    /// Active enrollments as if `others` were also committed
    fn get_enrollments(&self, others: &[Transaction]) -> LedgerResult<Vec<Enrollment>>;

    /// Current votes as if `others` were also committed
    fn get_votes(&self, others: &[Transaction]) -> LedgerResult<Vec<Vote>>;

    /// True if `tx` references an output that is spent, unknown or
    /// referenced twice, or claims something not currently claimable
    fn is_double_spend(&self, tx: &Transaction) -> LedgerResult<bool>;
}

/// Shared backend reference
pub type SharedBlockchain = Arc<dyn Blockchain>;
