//! Protocol economic constants and the utility-token generation schedule

use chain_core::{BlockHeight, PublicKey};
use std::sync::OnceLock;
use std::time::Duration;

/// Target block interval in seconds
pub const SECONDS_PER_BLOCK: u32 = 15;

/// Number of blocks between generation decrements
pub const DECREMENT_INTERVAL: u32 = 2_000_000;

/// Whole utility-token units generated per block, one entry per decrement
/// interval. The last entry applies to every later interval.
pub const GENERATION_AMOUNT: [u32; 22] = [
    8, 7, 6, 5, 4, 3, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

/// Compressed keys of the standby bookkeepers
pub const STANDBY_MINERS: [&str; 5] = [
    "0327da12b5c40200e9f65569476bbff2218da4f32548ff43b6387ec1416a231ee8",
    "026ce35b29147ad09e4afe4ec4a7319095f08198fa8babbe3c56e970b143528d22",
    "0209e7fd41dfb5c2f8dc72eb30358ac100ea8c72da18847befe06eade68cebfcb9",
    "039dafd8571a641058ccc832c5e2111ea39b09c0bde36050914384f7a48bce9bf9",
    "038dddc06ce687677a53d54f096d2591ba2302068cf123c1f2d75c2dddc5425579",
];

/// Decoded standby bookkeepers, in declaration order
pub fn standby_miners() -> &'static [PublicKey] {
    static KEYS: OnceLock<Vec<PublicKey>> = OnceLock::new();
    KEYS.get_or_init(|| {
        STANDBY_MINERS
            .iter()
            .map(|hex| PublicKey::from_hex(hex).expect("standby miner keys are protocol constants"))
            .collect()
    })
}

/// Target block interval
pub fn time_per_block() -> Duration {
    Duration::from_secs(u64::from(SECONDS_PER_BLOCK))
}

/// Units generated by the block at `height` under `schedule`
pub fn generation_at(height: BlockHeight, interval: u32, schedule: &[u32]) -> u32 {
    if interval == 0 {
        return 0;
    }
    let index = (height / interval) as usize;
    schedule
        .get(index)
        .or_else(|| schedule.last())
        .copied()
        .unwrap_or(0)
}

/// Units generated by the blocks in `[start, end)`
pub fn generated_between(
    start: BlockHeight,
    end: BlockHeight,
    interval: u32,
    schedule: &[u32],
) -> u64 {
    if interval == 0 || start >= end {
        return 0;
    }

    let mut total = 0u64;
    let mut height = start;
    while height < end {
        let interval_end = (height / interval)
            .saturating_add(1)
            .saturating_mul(interval)
            .min(end);
        let span = u64::from(interval_end - height);
        total += span * u64::from(generation_at(height, interval, schedule));
        if interval_end == height {
            break;
        }
        height = interval_end;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_sums_to_utility_supply() {
        let total: u64 = GENERATION_AMOUNT.iter().map(|&a| u64::from(a)).sum();
        assert_eq!(total * u64::from(DECREMENT_INTERVAL), 100_000_000);
    }

    #[test]
    fn test_generation_at() {
        assert_eq!(generation_at(0, DECREMENT_INTERVAL, &GENERATION_AMOUNT), 8);
        assert_eq!(generation_at(1_999_999, DECREMENT_INTERVAL, &GENERATION_AMOUNT), 8);
        assert_eq!(generation_at(2_000_000, DECREMENT_INTERVAL, &GENERATION_AMOUNT), 7);
        assert_eq!(generation_at(15_000_000, DECREMENT_INTERVAL, &GENERATION_AMOUNT), 1);
        // past the end of the schedule the last entry repeats
        assert_eq!(generation_at(u32::MAX, DECREMENT_INTERVAL, &GENERATION_AMOUNT), 1);
        assert_eq!(generation_at(5, DECREMENT_INTERVAL, &[]), 0);
    }

    #[test]
    fn test_generated_between_spans_intervals() {
        let schedule = [3, 2, 1];
        assert_eq!(generated_between(0, 10, 10, &schedule), 30);
        assert_eq!(generated_between(5, 15, 10, &schedule), 5 * 3 + 5 * 2);
        assert_eq!(generated_between(25, 45, 10, &schedule), 5 + 10 + 5);
        assert_eq!(generated_between(7, 7, 10, &schedule), 0);
        assert_eq!(generated_between(9, 3, 10, &schedule), 0);
    }

    #[test]
    fn test_generated_between_matches_per_block_sum() {
        let schedule = [4, 2, 1];
        let expected: u64 = (3..47)
            .map(|h| u64::from(generation_at(h, 7, &schedule)))
            .sum();
        assert_eq!(generated_between(3, 47, 7, &schedule), expected);
    }

    #[test]
    fn test_standby_miners_decode() {
        let keys = standby_miners();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0].to_hex(), STANDBY_MINERS[0]);
        assert_eq!(time_per_block(), Duration::from_secs(15));
    }
}
