//! Bookkeeper election
//!
//! The number of bookkeepers is the stake-weighted average of the candidate
//! counts requested by the middle half of all votes, never fewer than the
//! standby set. Candidates are ranked by the stake endorsing them and the
//! standby keys fill any remaining seats.

use crate::weighted::{weighted_average, weighted_filter, WeightedRange};
use crate::{ConsensusError, ConsensusResult};
use chain_core::script::{create_multisig_redeem_script, to_script_hash};
use chain_core::{Enrollment, Hash160, Hash256, PublicKey, Vote};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Number of bookkeepers requested by `votes`, floored at `standby_count`
pub fn miner_count_target(votes: &[Vote], standby_count: usize) -> usize {
    let mut sorted: Vec<&Vote> = votes.iter().collect();
    sorted.sort_by_key(|vote| vote.candidate_count());

    let filtered = weighted_filter(&sorted, WeightedRange::INTERQUARTILE, |vote| {
        vote.count.raw()
    });
    let average = weighted_average(&filtered, |vote| vote.candidate_count() as u64);
    usize::try_from(average)
        .unwrap_or(usize::MAX)
        .max(standby_count)
}

/// Stake endorsing each enrolled key. A vote adds its stake once for every
/// distinct enrollment it names, so a key enrolled twice and endorsed
/// through both enrollments receives the stake twice.
pub fn tally_votes(votes: &[Vote], enrollments: &[Enrollment]) -> BTreeMap<PublicKey, i128> {
    let registry: HashMap<Hash256, PublicKey> = enrollments
        .iter()
        .map(|enrollment| (enrollment.hash, enrollment.public_key))
        .collect();

    let mut tally = BTreeMap::new();
    for vote in votes {
        if vote.count.raw() <= 0 {
            continue;
        }
        let endorsed: BTreeSet<&Hash256> = vote.enrollments.iter().collect();
        for key in endorsed.into_iter().filter_map(|hash| registry.get(hash)) {
            *tally.entry(*key).or_insert(0i128) += i128::from(vote.count.raw());
        }
    }
    tally
}

/// Elect the bookkeeper set.
///
/// Result order is by descending stake, ties broken by ascending key,
/// followed by the standby keys in their given order, cut to the target
/// count. A standby key that was also elected appears twice when the
/// standby list is reached.
pub fn elect_miners(votes: &[Vote], enrollments: &[Enrollment], standby: &[PublicKey]) -> Vec<PublicKey> {
    let target = miner_count_target(votes, standby.len());

    let mut ranked: Vec<(PublicKey, i128)> = tally_votes(votes, enrollments).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let miners: Vec<PublicKey> = ranked
        .into_iter()
        .map(|(key, _)| key)
        .chain(standby.iter().copied())
        .take(target)
        .collect();

    debug!(
        "Elected {} of {} bookkeepers from {} votes and {} enrollments",
        miners.len(),
        target,
        votes.len(),
        enrollments.len()
    );
    miners
}

/// Signatures required from `n` bookkeepers: `n - floor((n - 1) / 3)`
pub fn signature_threshold(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n - (n - 1) / 3
}

/// Redeem script shared by the bookkeepers
pub fn miner_redeem_script(miners: &[PublicKey]) -> ConsensusResult<Vec<u8>> {
    if miners.is_empty() {
        return Err(ConsensusError::Election(
            "bookkeeper set is empty".to_string(),
        ));
    }
    Ok(create_multisig_redeem_script(
        signature_threshold(miners.len()),
        miners,
    )?)
}

/// Address of the multi-signature contract over `miners`
pub fn get_miner_address(miners: &[PublicKey]) -> ConsensusResult<Hash160> {
    Ok(to_script_hash(&miner_redeem_script(miners)?))
}
