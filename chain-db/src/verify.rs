//! Witness verification seam

use crate::LedgerResult;
use chain_core::Transaction;

/// Checks a transaction's witnesses. Script execution lives outside the
/// ledger; the ledger only supplies state checks of its own.
pub trait TransactionVerifier: Send + Sync {
    fn verify(&self, transaction: &Transaction) -> LedgerResult<bool>;
}

impl<F> TransactionVerifier for F
where
    F: Fn(&Transaction) -> bool + Send + Sync,
{
    fn verify(&self, transaction: &Transaction) -> LedgerResult<bool> {
        Ok(self(transaction))
    }
}
