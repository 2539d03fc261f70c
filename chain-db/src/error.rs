//! Ledger error types

use crate::BlockchainAbility;
use chain_consensus::ConsensusError;
use chain_core::CoreError;
use thiserror::Error;

/// Ledger error type. Missing data is never an error; lookups return
/// `Ok(None)` instead.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Backend does not maintain an index the operation needs
    #[error("{operation} requires backend ability {required}")]
    Unsupported {
        operation: &'static str,
        required: BlockchainAbility,
    },

    /// Backend I/O failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Amount arithmetic overflowed
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// The ledger or backend has been disposed
    #[error("Ledger has been disposed")]
    Disposed,

    /// Core type error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Consensus error
    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
