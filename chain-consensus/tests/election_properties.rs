//! Property-based tests for the election rules
//!
//! - The filter keeps exactly the window's share of the total weight
//! - Averages stay within the range of the averaged values
//! - Elected sets hold the ranked candidates followed by the standby keys,
//!   cut to the target count
//! - The signature threshold tolerates fewer than a third faulty signers

use chain_consensus::election::tally_votes;
use chain_consensus::{
    elect_miners, miner_count_target, signature_threshold, weighted_average, weighted_filter,
    WeightedRange,
};
use chain_core::{Enrollment, Fixed8, Hash256, PublicKey, Vote};
use proptest::prelude::*;
use std::collections::HashSet;

fn key(seed: u8) -> PublicKey {
    let mut bytes = [seed; 33];
    bytes[0] = 0x02;
    (0..=u8::MAX)
        .find_map(|tweak| {
            bytes[32] = tweak;
            PublicKey::decode(&bytes).ok()
        })
        .unwrap()
}

fn enrollment_hash(seed: u8) -> Hash256 {
    Hash256::new([seed; 32])
}

/// Strategy for votes over candidates 1..=20
fn vote_strategy() -> impl Strategy<Value = Vote> {
    (
        prop::collection::vec(1u8..=20, 0..8),
        1i64..1_000_000_000_000,
    )
        .prop_map(|(seeds, raw)| {
            Vote::new(
                seeds.into_iter().map(enrollment_hash).collect(),
                Fixed8::from_raw(raw),
            )
        })
}

/// Strategy for standby sets of distinct keys drawn from 15..=30
fn standby_strategy() -> impl Strategy<Value = Vec<PublicKey>> {
    prop::collection::btree_set(15u8..=30, 1..8)
        .prop_map(|seeds| seeds.into_iter().map(key).collect())
}

fn enrollments() -> Vec<Enrollment> {
    (1u8..=20)
        .map(|seed| Enrollment {
            hash: enrollment_hash(seed),
            public_key: key(seed),
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_filter_keeps_middle_half(weights in prop::collection::vec(0i64..1_000_000, 1..50)) {
        let total: i128 = weights.iter().map(|w| i128::from(*w)).sum();
        let filtered = weighted_filter(&weights, WeightedRange::INTERQUARTILE, |w| *w);
        let retained: i128 = filtered.iter().map(|(_, w)| *w).sum();
        // retained weights are scaled by the denominator of 4
        prop_assert_eq!(retained, 2 * total);
        prop_assert!(filtered.iter().all(|(_, w)| *w > 0));
    }

    #[test]
    fn prop_average_within_bounds(
        items in prop::collection::vec((0u64..100, 1i128..1_000_000), 1..30)
    ) {
        let values: Vec<u64> = items.iter().map(|(v, _)| *v).collect();
        let weighted: Vec<(&u64, i128)> = values
            .iter()
            .zip(items.iter())
            .map(|(v, (_, w))| (v, *w))
            .collect();
        let average = weighted_average(&weighted, |v| *v);
        prop_assert!(average >= *values.iter().min().unwrap());
        prop_assert!(average <= *values.iter().max().unwrap());
    }

    #[test]
    fn prop_elected_set_is_well_formed(
        votes in prop::collection::vec(vote_strategy(), 0..20),
        standby in standby_strategy(),
    ) {
        let enrollments = enrollments();
        let target = miner_count_target(&votes, standby.len());
        let miners = elect_miners(&votes, &enrollments, &standby);

        let candidates = tally_votes(&votes, &enrollments).len();
        prop_assert!(target >= standby.len());
        prop_assert_eq!(miners.len(), target.min(candidates + standby.len()));
        prop_assert!(miners.len() >= standby.len());
        prop_assert!(miners.iter().all(|k| !k.is_infinity()));

        // ranked candidates come first and are distinct
        let ranked: HashSet<PublicKey> = miners.iter().take(candidates).copied().collect();
        prop_assert_eq!(ranked.len(), candidates.min(miners.len()));
        // whatever follows is a prefix of the standby list
        let rest: Vec<PublicKey> = miners.iter().skip(candidates).copied().collect();
        prop_assert_eq!(&rest[..], &standby[..rest.len()]);

        // deterministic regardless of vote order
        let mut reversed = votes.clone();
        reversed.reverse();
        let target_reversed = miner_count_target(&reversed, standby.len());
        if target_reversed == target {
            prop_assert_eq!(elect_miners(&reversed, &enrollments, &standby), miners);
        }
    }

    #[test]
    fn prop_threshold_tolerates_a_third(n in 1usize..1024) {
        let threshold = signature_threshold(n);
        let faulty = n - threshold;
        prop_assert!(threshold >= 1 && threshold <= n);
        prop_assert!(3 * faulty < n);
        prop_assert!(3 * (faulty + 1) >= n);
    }
}
