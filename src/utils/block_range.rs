/// Split the inclusive span `[from, to]` into consecutive inclusive chunks
/// of at most `max_range` blocks.
///
/// Nodes cap the span a single `eth_getLogs` request may cover, so large
/// queries are issued chunk by chunk.
pub fn block_ranges(from: u64, to: u64, max_range: u64) -> Vec<(u64, u64)> {
    if from > to {
        return Vec::new();
    }

    let step = max_range.max(1);
    let mut ranges = Vec::with_capacity(((to - from) / step + 1) as usize);
    let mut start = from;

    loop {
        let end = start.saturating_add(step - 1).min(to);
        ranges.push((start, end));
        if end == to {
            break;
        }
        start = end + 1;
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk() {
        assert_eq!(block_ranges(10, 20, 100), vec![(10, 20)]);
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(block_ranges(0, 9, 5), vec![(0, 4), (5, 9)]);
    }

    #[test]
    fn test_remainder_chunk() {
        assert_eq!(block_ranges(1, 11, 5), vec![(1, 5), (6, 10), (11, 11)]);
    }

    #[test]
    fn test_empty_when_reversed() {
        assert!(block_ranges(5, 4, 10).is_empty());
    }

    #[test]
    fn test_zero_range_treated_as_one() {
        assert_eq!(block_ranges(3, 5, 0), vec![(3, 3), (4, 4), (5, 5)]);
    }

    #[test]
    fn test_does_not_overflow_at_max_block() {
        assert_eq!(block_ranges(u64::MAX - 1, u64::MAX, 10), vec![(u64::MAX - 1, u64::MAX)]);
    }
}
