//! Weighted percentile filter and weighted average
//!
//! Both operate on exact integers. Weights are scaled by the range
//! denominator so that clipping at a fractional percentile never rounds.

/// Percentile window `[lower / denominator, upper / denominator]` of the
/// cumulative weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedRange {
    pub lower: u32,
    pub upper: u32,
    pub denominator: u32,
}

impl WeightedRange {
    /// The middle half of the weight, 25% to 75%
    pub const INTERQUARTILE: WeightedRange = WeightedRange {
        lower: 1,
        upper: 3,
        denominator: 4,
    };

    /// Whether the window is well formed
    pub fn is_valid(&self) -> bool {
        self.denominator > 0 && self.lower <= self.upper && self.upper <= self.denominator
    }
}

/// Keep the part of each item's weight that falls inside `range`.
///
/// Items are taken in the given order and laid end to end by weight. The
/// returned weight of an item is the length of its overlap with the
/// window, scaled by `range.denominator`. Items with no overlap, or with a
/// non-positive weight, are dropped.
pub fn weighted_filter<'a, T, F>(items: &'a [T], range: WeightedRange, weight: F) -> Vec<(&'a T, i128)>
where
    F: Fn(&T) -> i64,
{
    if !range.is_valid() {
        return Vec::new();
    }

    let weighted: Vec<(&T, i128)> = items
        .iter()
        .map(|item| (item, i128::from(weight(item))))
        .filter(|(_, w)| *w > 0)
        .collect();
    let total: i128 = weighted.iter().map(|(_, w)| *w).sum();
    if total == 0 {
        return Vec::new();
    }

    let scale = i128::from(range.denominator);
    let window_start = i128::from(range.lower) * total;
    let window_end = i128::from(range.upper) * total;

    let mut result = Vec::new();
    let mut cumulative = 0i128;
    for (item, w) in weighted {
        let item_start = cumulative * scale;
        cumulative += w;
        let item_end = cumulative * scale;
        if item_start >= window_end {
            break;
        }
        let retained = item_end.min(window_end) - item_start.max(window_start);
        if retained > 0 {
            result.push((item, retained));
        }
    }
    result
}

/// Weighted mean of `value` over `items`, rounded half up. Zero when the
/// total weight is zero.
pub fn weighted_average<T, F>(items: &[(&T, i128)], value: F) -> u64
where
    F: Fn(&T) -> u64,
{
    let total_weight: i128 = items.iter().map(|(_, w)| *w).sum();
    if total_weight <= 0 {
        return 0;
    }
    let total_value: i128 = items
        .iter()
        .map(|(item, w)| i128::from(value(item)) * w)
        .sum();
    let rounded = (2 * total_value + total_weight) / (2 * total_weight);
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interquartile_clips_ends() {
        // four equal weights: only the middle two survive
        let items = [1u64, 2, 3, 4];
        let filtered = weighted_filter(&items, WeightedRange::INTERQUARTILE, |_| 10);
        let kept: Vec<u64> = filtered.iter().map(|(v, _)| **v).collect();
        assert_eq!(kept, vec![2, 3]);
        assert_eq!(weighted_average(&filtered, |v| *v), 3);
    }

    #[test]
    fn test_partial_overlap() {
        // total 8, window [2, 6]: item a covers [0,3) -> 1, item b [3,8) -> 3
        let items = [("a", 3i64), ("b", 5)];
        let filtered = weighted_filter(&items, WeightedRange::INTERQUARTILE, |(_, w)| *w);
        let weights: Vec<i128> = filtered.iter().map(|(_, w)| *w).collect();
        assert_eq!(weights, vec![4, 12]);
    }

    #[test]
    fn test_single_item_survives() {
        let items = [7u64];
        let filtered = weighted_filter(&items, WeightedRange::INTERQUARTILE, |_| 1);
        assert_eq!(filtered.len(), 1);
        assert_eq!(weighted_average(&filtered, |v| *v), 7);
    }

    #[test]
    fn test_empty_and_zero_weight() {
        let items: [u64; 0] = [];
        let filtered = weighted_filter(&items, WeightedRange::INTERQUARTILE, |_| 1);
        assert!(filtered.is_empty());
        assert_eq!(weighted_average(&filtered, |v| *v), 0);

        let zeros = [1u64, 2];
        assert!(weighted_filter(&zeros, WeightedRange::INTERQUARTILE, |_| 0).is_empty());
    }

    #[test]
    fn test_average_rounds_half_up() {
        let (a, b) = (1u64, 2u64);
        let items = vec![(&a, 1i128), (&b, 1i128)];
        assert_eq!(weighted_average(&items, |v| *v), 2);

        let items = vec![(&a, 2i128), (&b, 1i128)];
        assert_eq!(weighted_average(&items, |v| *v), 1);
    }

    #[test]
    fn test_invalid_range() {
        let items = [1u64];
        let range = WeightedRange {
            lower: 3,
            upper: 1,
            denominator: 4,
        };
        assert!(weighted_filter(&items, range, |_| 1).is_empty());
    }
}
