//! Calendar-day bucketing of timestamped records.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use super::calendar::{days_before, local_date, RelativeWindow, MAX_WINDOW_DAYS};
use crate::types::{Contact, Deal, Lead};

/// Anything with a creation timestamp.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

impl Timestamped for Lead {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Deal {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for Contact {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Timestamped for DateTime<Utc> {
    fn created_at(&self) -> DateTime<Utc> {
        *self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Exactly `window_days` ascending, zero-filled day counts for the window ending `today`.
///
/// Records are assigned to their calendar day in `tz`; those outside the window are ignored.
/// Windows longer than [`MAX_WINDOW_DAYS`] are clamped, and the window never reaches past
/// the earliest representable date.
pub fn bucket_by_day<T: Timestamped>(
    records: &[T],
    window_days: u32,
    today: NaiveDate,
    tz: Tz,
) -> Vec<DayCount> {
    let window_days = window_days.min(MAX_WINDOW_DAYS);
    if window_days == 0 {
        return Vec::new();
    }
    let first = days_before(today, u64::from(window_days) - 1);
    let span = (today - first).num_days() + 1;
    let mut buckets: Vec<DayCount> = first
        .iter_days()
        .take(span as usize)
        .map(|date| DayCount { date, count: 0 })
        .collect();

    for record in records {
        let day = local_date(record.created_at(), tz);
        if day < first || day > today {
            continue;
        }
        let offset = (day - first).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(offset) {
            bucket.count += 1;
        }
    }
    buckets
}

/// Number of records whose calendar day in `tz` falls inside `window`.
pub fn count_in_window<T: Timestamped>(
    records: &[T],
    window: RelativeWindow,
    today: NaiveDate,
    tz: Tz,
) -> u32 {
    records
        .iter()
        .filter(|r| window.contains(today, local_date(r.created_at(), tz)))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> DateTime<Utc> {
        text.parse().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_window_has_exact_length_and_sum() {
        let stamps = vec![
            at("2026-10-19T09:00:00Z"),
            at("2026-10-19T23:59:59Z"),
            at("2026-10-18T00:00:00Z"),
            at("2026-09-20T12:00:00Z"),
            // Outside the 30-day window.
            at("2026-09-19T23:59:59Z"),
            at("2026-10-20T00:00:00Z"),
        ];
        let buckets = bucket_by_day(&stamps, 30, today(), chrono_tz::UTC);
        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2026, 9, 20).unwrap());
        assert_eq!(buckets[29].date, today());
        assert_eq!(buckets[29].count, 2);
        assert_eq!(buckets[28].count, 1);
        assert_eq!(buckets[0].count, 1);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 4);
        assert!(buckets.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_zero_filled_when_empty() {
        let buckets = bucket_by_day::<DateTime<Utc>>(&[], 7, today(), chrono_tz::UTC);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_zero_window() {
        let stamps = vec![at("2026-10-19T09:00:00Z")];
        assert!(bucket_by_day(&stamps, 0, today(), chrono_tz::UTC).is_empty());
    }

    #[test]
    fn test_day_assignment_follows_pinned_timezone() {
        // 02:30 UTC on the 19th is still the 18th in New York.
        let stamps = vec![at("2026-10-19T02:30:00Z")];
        let utc = bucket_by_day(&stamps, 2, today(), chrono_tz::UTC);
        assert_eq!((utc[0].count, utc[1].count), (0, 1));
        let ny = bucket_by_day(&stamps, 2, today(), chrono_tz::America::New_York);
        assert_eq!((ny[0].count, ny[1].count), (1, 0));
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let stamps = vec![at("2026-10-19T09:00:00Z"), at("2001-01-01T00:00:00Z")];
        let buckets = bucket_by_day(&stamps, 4_000_000_000, today(), chrono_tz::UTC);
        assert_eq!(buckets.len(), MAX_WINDOW_DAYS as usize);
        assert_eq!(buckets.last().map(|b| b.date), Some(today()));
        assert_eq!(buckets.iter().map(|b| b.count).sum::<u32>(), 1);
    }

    #[test]
    fn test_window_stops_at_earliest_date() {
        let buckets = bucket_by_day::<DateTime<Utc>>(&[], 10, NaiveDate::MIN, chrono_tz::UTC);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, NaiveDate::MIN);
    }

    #[test]
    fn test_count_in_window() {
        let stamps = vec![
            at("2026-10-19T09:00:00Z"),
            at("2026-10-18T09:00:00Z"),
            at("2026-10-12T09:00:00Z"),
            at("2026-10-11T09:00:00Z"),
        ];
        let tz = chrono_tz::UTC;
        assert_eq!(count_in_window(&stamps, RelativeWindow::Today, today(), tz), 1);
        assert_eq!(count_in_window(&stamps, RelativeWindow::Yesterday, today(), tz), 1);
        assert_eq!(count_in_window(&stamps, RelativeWindow::Week, today(), tz), 3);
        assert_eq!(count_in_window(&stamps, RelativeWindow::Month, today(), tz), 4);
    }
}
