//! Backend capability flags

use crate::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of indexes a backend maintains. Index-dependent queries must check
/// these before running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockchainAbility(u8);

impl BlockchainAbility {
    /// No optional index
    pub const NONE: BlockchainAbility = BlockchainAbility(0);
    /// Transaction lookup by hash
    pub const TRANSACTION_INDEXES: BlockchainAbility = BlockchainAbility(0x01);
    /// Unspent output lookup
    pub const UNSPENT_INDEXES: BlockchainAbility = BlockchainAbility(0x02);
    /// Issuance and system fee totals
    pub const STATISTICS: BlockchainAbility = BlockchainAbility(0x04);
    /// Every index
    pub const ALL: BlockchainAbility = BlockchainAbility(0x07);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones
    pub const fn from_bits_truncate(bits: u8) -> Self {
        BlockchainAbility(bits & Self::ALL.0)
    }

    pub const fn contains(self, other: BlockchainAbility) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: BlockchainAbility) -> Self {
        BlockchainAbility(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Fail with [`LedgerError::Unsupported`] unless `required` is present
    pub fn require(self, operation: &'static str, required: BlockchainAbility) -> LedgerResult<()> {
        if self.contains(required) {
            Ok(())
        } else {
            Err(LedgerError::Unsupported {
                operation,
                required,
            })
        }
    }
}

impl BitOr for BlockchainAbility {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for BlockchainAbility {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Display for BlockchainAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::TRANSACTION_INDEXES, "TransactionIndexes"),
            (Self::UNSPENT_INDEXES, "UnspentIndexes"),
            (Self::STATISTICS, "Statistics"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", set.join(" | "))
        }
    }
}
