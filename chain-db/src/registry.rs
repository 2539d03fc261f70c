//! Default ledger registry
//!
//! Holds the ledger a process treats as its default. Replacing it disposes
//! the previous instance. Readers that still hold the old `Arc<Ledger>`
//! see a disposed ledger, so callers must not let access span a swap.

use crate::{Blockchain, Ledger, LedgerError, LedgerResult};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Slot for the default ledger
#[derive(Default)]
pub struct LedgerRegistry {
    current: RwLock<Option<Arc<Ledger>>>,
}

impl LedgerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ledger` the default and dispose the one it replaces.
    /// Registering the current default again is a no-op.
    pub fn register(&self, ledger: Arc<Ledger>) -> LedgerResult<Arc<Ledger>> {
        if ledger.is_disposed() {
            return Err(LedgerError::InvalidArgument(
                "cannot register a disposed ledger".to_string(),
            ));
        }

        let previous = self.current.write().replace(Arc::clone(&ledger));
        match previous {
            Some(previous) if Arc::ptr_eq(&previous, &ledger) => {}
            Some(previous) => {
                previous.dispose();
                info!(
                    "Replaced default ledger at height {} with one at height {}",
                    previous.height(),
                    ledger.height()
                );
            }
            None => info!("Registered default ledger at height {}", ledger.height()),
        }
        Ok(ledger)
    }

    /// Current default ledger
    pub fn current(&self) -> Option<Arc<Ledger>> {
        self.current.read().clone()
    }

    /// Remove and dispose the default ledger
    pub fn clear(&self) {
        if let Some(previous) = self.current.write().take() {
            previous.dispose();
            info!("Cleared default ledger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBlockchain;
    use chain_consensus::ConsensusConfig;

    fn ledger() -> Arc<Ledger> {
        Arc::new(Ledger::new(Arc::new(MemoryBlockchain::new()), ConsensusConfig::default()).unwrap())
    }

    #[test]
    fn test_register_replaces_and_disposes() {
        let registry = LedgerRegistry::new();
        assert!(registry.current().is_none());

        let first = registry.register(ledger()).unwrap();
        assert!(Arc::ptr_eq(&registry.current().unwrap(), &first));

        let second = registry.register(ledger()).unwrap();
        assert!(first.is_disposed());
        assert!(!second.is_disposed());
        assert!(Arc::ptr_eq(&registry.current().unwrap(), &second));
    }

    #[test]
    fn test_register_same_ledger_twice() {
        let registry = LedgerRegistry::new();
        let ledger = registry.register(ledger()).unwrap();
        registry.register(Arc::clone(&ledger)).unwrap();
        assert!(!ledger.is_disposed());
    }

    #[test]
    fn test_register_disposed_rejected() {
        let registry = LedgerRegistry::new();
        let current = registry.register(ledger()).unwrap();

        let stale = ledger();
        stale.dispose();
        assert!(matches!(
            registry.register(stale),
            Err(LedgerError::InvalidArgument(_))
        ));
        assert!(!current.is_disposed());
    }

    #[test]
    fn test_clear() {
        let registry = LedgerRegistry::new();
        let ledger = registry.register(ledger()).unwrap();
        registry.clear();
        assert!(ledger.is_disposed());
        assert!(registry.current().is_none());
    }
}
