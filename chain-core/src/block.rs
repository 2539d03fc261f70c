//! Block data structures and operations

use crate::crypto::hash256;
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::script::Script;
use crate::{BlockHeight, CoreError, CoreResult, Hash160, Hash256, Timestamp, Transaction};
use chrono::{DateTime, Utc};

/// Maximum number of transactions in one block
pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 65535;

/// Block header. The hash covers every field except the witness script
/// and is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: u32,
    prev_hash: Hash256,
    merkle_root: Hash256,
    timestamp: Timestamp,
    height: BlockHeight,
    nonce: u64,
    /// Address of the bookkeepers allowed to sign the next block
    next_miner: Hash160,
    script: Script,
    hash: Hash256,
}

impl Header {
    /// Create an unsigned header
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u32,
        prev_hash: Hash256,
        merkle_root: Hash256,
        timestamp: Timestamp,
        height: BlockHeight,
        nonce: u64,
        next_miner: Hash160,
    ) -> Self {
        let mut header = Self {
            version,
            prev_hash,
            merkle_root,
            timestamp,
            height,
            nonce,
            next_miner,
            script: Script::default(),
            hash: Hash256::zero(),
        };
        header.hash = hash256(&header.unsigned_data());
        header
    }

    /// Attach the bookkeepers' witness; the hash is unaffected
    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn prev_hash(&self) -> Hash256 {
        self.prev_hash
    }

    pub fn merkle_root(&self) -> Hash256 {
        self.merkle_root
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Timestamp as a UTC date
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::from(self.timestamp), 0)
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn next_miner(&self) -> Hash160 {
        self.next_miner
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Check if this is a genesis header
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.prev_hash.is_zero()
    }

    /// Encoding covered by the hash
    pub fn unsigned_data(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned(&mut writer);
        writer.into_bytes()
    }

    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write_hash256(&self.prev_hash);
        writer.write_hash256(&self.merkle_root);
        writer.write_u32(self.timestamp);
        writer.write_u32(self.height);
        writer.write_u64(self.nonce);
        writer.write_hash160(&self.next_miner);
    }

    fn serialize_signed(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        writer.write_u8(1);
        self.script.serialize(writer);
    }

    fn deserialize_signed(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        let header = Header::new(
            reader.read_u32()?,
            reader.read_hash256()?,
            reader.read_hash256()?,
            reader.read_u32()?,
            reader.read_u32()?,
            reader.read_u64()?,
            reader.read_hash160()?,
        );
        let marker = reader.read_u8()?;
        if marker != 1 {
            return Err(CoreError::Format(format!(
                "expected one header script, found {}",
                marker
            )));
        }
        Ok(header.with_script(Script::deserialize(reader)?))
    }
}

/// A header travels on its own as a block with zero transactions
impl Serializable for Header {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_signed(writer);
        writer.write_u8(0);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        let header = Header::deserialize_signed(reader)?;
        if reader.read_u8()? != 0 {
            return Err(CoreError::Format(
                "header must not carry transactions".to_string(),
            ));
        }
        Ok(header)
    }
}

/// Merkle root over transaction hashes; the last hash of an odd level is
/// paired with itself
pub fn compute_merkle_root(hashes: &[Hash256]) -> Hash256 {
    if hashes.is_empty() {
        return Hash256::zero();
    }
    let mut level = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut data = [0u8; 64];
                data[..32].copy_from_slice(left.as_bytes());
                data[32..].copy_from_slice(right.as_bytes());
                hash256(&data)
            })
            .collect();
    }
    level[0]
}

/// Complete block with header and transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    header: Header,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Build a block, deriving the merkle root from `transactions`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u32,
        prev_hash: Hash256,
        timestamp: Timestamp,
        height: BlockHeight,
        nonce: u64,
        next_miner: Hash160,
        transactions: Vec<Transaction>,
    ) -> Self {
        let hashes: Vec<Hash256> = transactions.iter().map(Transaction::hash).collect();
        let header = Header::new(
            version,
            prev_hash,
            compute_merkle_root(&hashes),
            timestamp,
            height,
            nonce,
            next_miner,
        );
        Self {
            header,
            transactions,
        }
    }

    /// Assemble a block from a received header and body without checks
    pub fn from_parts(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Attach the bookkeepers' witness to the header
    pub fn with_script(mut self, script: Script) -> Self {
        self.header = self.header.with_script(script);
        self
    }

    /// Get the block hash (same as header hash)
    pub fn hash(&self) -> Hash256 {
        self.header.hash()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn height(&self) -> BlockHeight {
        self.header.height()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Get transaction by hash
    pub fn get_transaction(&self, hash: &Hash256) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.hash() == *hash)
    }

    /// Recompute the merkle root and compare with the header
    pub fn verify_merkle_root(&self) -> bool {
        let hashes: Vec<Hash256> = self.transactions.iter().map(Transaction::hash).collect();
        compute_merkle_root(&hashes) == self.header.merkle_root()
    }

    /// Check if block is genesis
    pub fn is_genesis(&self) -> bool {
        self.header.is_genesis()
    }
}

impl Serializable for Block {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.header.serialize_signed(writer);
        writer.write_array(&self.transactions);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        let header = Header::deserialize_signed(reader)?;
        let transactions = reader.read_array(MAX_TRANSACTIONS_PER_BLOCK)?;
        Ok(Block::from_parts(header, transactions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fixed8, TransactionOutput, TransactionPayload};

    fn miner_tx(nonce: u32) -> Transaction {
        Transaction::new(TransactionPayload::Miner { nonce }, Vec::new(), Vec::new(), Vec::new())
    }

    #[test]
    fn test_block_hash_ignores_script() {
        let block = Block::new(0, Hash256::zero(), 1, 1, 42, Hash160::zero(), vec![miner_tx(1)]);
        let signed = block.clone().with_script(Script::new(vec![1], vec![2]));
        assert_eq!(block.hash(), signed.hash());
        assert_eq!(block.hash(), block.header().hash());
    }

    #[test]
    fn test_merkle_root_single_and_odd() {
        let a = miner_tx(1).hash();
        let b = miner_tx(2).hash();
        let c = miner_tx(3).hash();
        assert_eq!(compute_merkle_root(&[a]), a);
        // odd level duplicates the last element
        assert_eq!(compute_merkle_root(&[a, b, c]), compute_merkle_root(&[a, b, c, c]));
        assert_ne!(compute_merkle_root(&[a, b]), compute_merkle_root(&[b, a]));
        assert_eq!(compute_merkle_root(&[]), Hash256::zero());
    }

    #[test]
    fn test_verify_merkle_root() {
        let block = Block::new(0, Hash256::zero(), 1, 1, 42, Hash160::zero(), vec![miner_tx(1)]);
        assert!(block.verify_merkle_root());

        let tampered = Block::from_parts(block.header().clone(), vec![miner_tx(2)]);
        assert!(!tampered.verify_merkle_root());
    }

    #[test]
    fn test_header_projection_encoding() {
        let output = TransactionOutput::new(Hash256::new([1u8; 32]), Fixed8::SATOSHI, Hash160::zero());
        let tx = Transaction::contract(Vec::new(), vec![output]);
        let block = Block::new(0, Hash256::new([9u8; 32]), 7, 3, 1, Hash160::zero(), vec![miner_tx(5), tx]);

        let header_bytes = block.header().to_bytes();
        assert_eq!(*header_bytes.last().unwrap(), 0);
        let header = Header::from_bytes(&header_bytes).unwrap();
        assert_eq!(header.hash(), block.hash());
        assert_eq!(header.height(), 3);

        // a header is also decodable as an empty block
        let empty = Block::from_bytes(&header_bytes).unwrap();
        assert!(empty.transactions().is_empty());

        let decoded = Block::from_bytes(&block.to_bytes()).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_header_with_transactions_rejected() {
        let block = Block::new(0, Hash256::zero(), 1, 1, 42, Hash160::zero(), vec![miner_tx(1)]);
        assert!(Header::from_bytes(&block.to_bytes()).is_err());
    }
}
