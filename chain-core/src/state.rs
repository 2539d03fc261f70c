//! Derived ledger records used by election and claim accounting

use crate::{BlockHeight, Fixed8, Hash256, PublicKey, TransactionOutput};
use serde::{Deserialize, Serialize};

/// Stake endorsing a set of enrollments. Derived from unspent outputs of
/// voting transactions, never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Enrollment transaction hashes endorsed by this vote
    pub enrollments: Vec<Hash256>,
    /// Total staked amount
    pub count: Fixed8,
}

impl Vote {
    pub fn new(enrollments: Vec<Hash256>, count: Fixed8) -> Self {
        Self { enrollments, count }
    }

    /// Number of distinct candidates this vote asks for
    pub fn candidate_count(&self) -> usize {
        let mut hashes = self.enrollments.clone();
        hashes.sort_unstable();
        hashes.dedup();
        hashes.len()
    }
}

/// Active bookkeeper candidacy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enrollment {
    /// Hash of the enrollment transaction
    pub hash: Hash256,
    pub public_key: PublicKey,
}

/// A spent governing-token output whose generated utility tokens have
/// not been claimed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claimable {
    pub output: TransactionOutput,
    /// Height of the block that created the output
    pub start_height: BlockHeight,
    /// Height of the block that spent it
    pub end_height: BlockHeight,
}

impl Claimable {
    /// Number of blocks the output was held for
    pub fn held_blocks(&self) -> u32 {
        self.end_height.saturating_sub(self.start_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hash160;

    #[test]
    fn test_vote_candidate_count() {
        let vote = Vote::new(vec![Hash256::zero(), Hash256::new([1u8; 32])], Fixed8::SATOSHI);
        assert_eq!(vote.candidate_count(), 2);

        let repeated = Vote::new(vec![Hash256::zero(), Hash256::zero()], Fixed8::SATOSHI);
        assert_eq!(repeated.candidate_count(), 1);
    }

    #[test]
    fn test_claimable_held_blocks() {
        let claimable = Claimable {
            output: TransactionOutput::new(Hash256::zero(), Fixed8::SATOSHI, Hash160::zero()),
            start_height: 10,
            end_height: 25,
        };
        assert_eq!(claimable.held_blocks(), 15);
    }
}
