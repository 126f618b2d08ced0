use std::collections::BTreeMap;

/// Histogram of `records` by `key`.
pub fn distribution_by<T, K, F>(records: &[T], key: F) -> BTreeMap<K, u32>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

/// Round to the nearest integer, halves toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Period-over-period change in percent.
///
/// A rise from zero is reported as 100; zero to zero is 0.
pub fn percent_change(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        return if current > 0 { 100 } else { 0 };
    }
    round_half_up((current - previous) as f64 / previous as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_fixed_points() {
        assert_eq!(percent_change(0, 0), 0);
        assert_eq!(percent_change(5, 0), 100);
        assert_eq!(percent_change(10, 5), 100);
        assert_eq!(percent_change(5, 10), -50);
    }

    #[test]
    fn test_percent_change_rounding() {
        // 1/3 up => 33.33
        assert_eq!(percent_change(4, 3), 33);
        // 1/8 => 12.5 rounds up, -1/8 => -12.5 rounds toward +inf
        assert_eq!(percent_change(9, 8), 13);
        assert_eq!(percent_change(7, 8), -12);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(74.99), 75);
    }

    #[test]
    fn test_distribution_counts() {
        let statuses = ["Connected", "Keep an Eye", "Connected", "Closed"];
        let counts = distribution_by(&statuses[..], |s| s.to_string());
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["Connected"], 2);
        assert_eq!(counts["Closed"], 1);
        assert_eq!(counts.values().sum::<u32>(), 4);
    }

    #[test]
    fn test_distribution_empty() {
        let counts = distribution_by(&Vec::<u8>::new(), |b| *b);
        assert!(counts.is_empty());
    }
}
