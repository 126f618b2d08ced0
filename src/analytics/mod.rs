//! Aggregation engine: ranking, day buckets and distributions over record snapshots.
//!
//! Everything here is pure and total. Callers fetch and normalize first, then aggregate.

pub mod buckets;
pub mod calendar;
pub mod distribution;
pub mod ranking;

pub use buckets::{bucket_by_day, count_in_window, DayCount, Timestamped};
pub use calendar::{RelativeWindow, ReportClock};
pub use distribution::{distribution_by, percent_change, round_half_up};
pub use ranking::{performance_score, rank_reps, LeaderboardRow};
