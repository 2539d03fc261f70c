//! Core ledger data structures
//!
//! This crate provides the fundamental building blocks of the ledger:
//! - Basic types (Hash256, Hash160, Fixed8, PublicKey)
//! - The binary wire codec
//! - Transaction and Block structures
//! - Redeem scripts and script hashes
//! - The genesis block constant

pub mod block;
pub mod crypto;
pub mod error;
pub mod fixed8;
pub mod genesis;
pub mod io;
pub mod script;
pub mod state;
pub mod transaction;
pub mod types;

// Re-export commonly used types
pub use block::*;
pub use crypto::{hash160, hash256, PublicKey};
pub use error::*;
pub use fixed8::*;
pub use genesis::{genesis_block, governing_token, utility_token};
pub use io::{BinaryReader, BinaryWriter, Serializable};
pub use script::Script;
pub use state::*;
pub use transaction::*;
pub use types::*;
