//! Consensus error types

use chain_core::CoreError;
use thiserror::Error;

/// Consensus error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid bookkeeper key
    #[error("Invalid miner key: {0}")]
    InvalidMiner(String),

    /// Election could not produce a miner set
    #[error("Election error: {0}")]
    Election(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from the core types
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for ConsensusError {
    fn from(err: serde_json::Error) -> Self {
        ConsensusError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ConsensusError {
    fn from(err: toml::de::Error) -> Self {
        ConsensusError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for ConsensusError {
    fn from(err: toml::ser::Error) -> Self {
        ConsensusError::Serialization(err.to_string())
    }
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
