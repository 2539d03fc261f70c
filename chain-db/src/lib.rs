//! Ledger storage layer
//!
//! This crate defines the contract every ledger backend fulfils and the
//! pieces layered on top of it:
//! - The `Blockchain` trait and backend capability flags
//! - Header chain tracking ahead of block download
//! - The `Ledger` handle with bookkeeper caching and commit notification
//! - The default ledger registry
//! - An in-memory backend with full indexes

pub mod ability;
pub mod error;
pub mod header_chain;
pub mod ledger;
pub mod memory;
pub mod notify;
pub mod registry;
pub mod traits;
pub mod verify;

pub use ability::BlockchainAbility;
pub use error::{LedgerError, LedgerResult};
pub use header_chain::HeaderChain;
pub use ledger::{Ledger, ELECTION_ABILITY};
pub use memory::MemoryBlockchain;
pub use notify::{PersistNotifier, PersistObserver};
pub use registry::LedgerRegistry;
pub use traits::{Blockchain, SharedBlockchain};
pub use verify::TransactionVerifier;
