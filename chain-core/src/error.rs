//! Error types for the core crate

use thiserror::Error;

/// Core ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Unknown transaction type: 0x{0:02x}")]
    UnknownTransactionType(u8),

    #[error("Unknown asset type: 0x{0:02x}")]
    UnknownAssetType(u8),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow")]
    Overflow,

    #[error("Invalid script: {0}")]
    Script(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
