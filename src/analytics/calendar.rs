//! Calendar-day arithmetic in a single pinned timezone (pure, no I/O).
//!
//! Every "today", trailing window and day bucket in reports is computed here so that one
//! timezone convention applies throughout. The default is UTC.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::UTC;

/// Parse an IANA timezone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    match name.trim().parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            log::warn!("Unknown timezone '{}', falling back to UTC", name);
            DEFAULT_TIMEZONE
        }
    }
}

/// Longest day window a report will build. Longer requests are clamped to it.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// `n` days before `day`, saturating at the earliest representable date.
pub fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// `n` days after `day`, saturating at the latest representable date.
pub fn days_after(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_add_days(Days::new(n)).unwrap_or(NaiveDate::MAX)
}

/// Calendar day of `ts` in `tz`.
pub fn local_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// First instant of `day` in `tz`, as UTC.
pub fn day_start_utc(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Last millisecond of `day` in `tz`, as UTC.
pub fn day_end_utc(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    match day.succ_opt() {
        Some(next) => day_start_utc(next, tz) - Duration::milliseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Source of "now" for reports, pinned to one timezone.
#[derive(Debug, Clone)]
pub struct ReportClock {
    tz: Tz,
    pinned: Option<DateTime<Utc>>,
}

impl ReportClock {
    /// Wall clock in `tz`.
    pub fn system(tz: Tz) -> Self {
        Self { tz, pinned: None }
    }

    /// Clock frozen at `at`.
    pub fn pinned(tz: Tz, at: DateTime<Utc>) -> Self {
        Self {
            tz,
            pinned: Some(at),
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.pinned.unwrap_or_else(Utc::now)
    }

    pub fn today(&self) -> NaiveDate {
        local_date(self.now(), self.tz)
    }

    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        local_date(ts, self.tz)
    }
}

impl Default for ReportClock {
    fn default() -> Self {
        Self::system(DEFAULT_TIMEZONE)
    }
}

/// A named time window relative to today ("today", "last 7 days").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeWindow {
    Today,
    Yesterday,
    /// Today and the 7 days before it.
    Week,
    /// Today and the 30 days before it.
    Month,
    /// The trailing `n` calendar days ending today.
    LastDays(u32),
    /// Today through `n` days ahead.
    NextDays(u32),
}

impl RelativeWindow {
    /// Inclusive `(first, last)` calendar days of the window. Empty windows have
    /// `first > last`.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            RelativeWindow::Today => (today, today),
            RelativeWindow::Yesterday => {
                let yesterday = days_before(today, 1);
                (yesterday, yesterday)
            }
            RelativeWindow::Week => (days_before(today, 7), today),
            RelativeWindow::Month => (days_before(today, 30), today),
            RelativeWindow::LastDays(0) => (days_after(today, 1), today),
            RelativeWindow::LastDays(n) => (days_before(today, u64::from(n) - 1), today),
            RelativeWindow::NextDays(n) => (today, days_after(today, u64::from(n))),
        }
    }

    pub fn contains(self, today: NaiveDate, day: NaiveDate) -> bool {
        let (first, last) = self.bounds(today);
        first <= day && day <= last
    }

    /// Value sent in a `RelativeMatch` predicate.
    pub fn as_filter_value(self) -> String {
        match self {
            RelativeWindow::Today => "Today".to_string(),
            RelativeWindow::Yesterday => "yesterday".to_string(),
            RelativeWindow::Week => "week".to_string(),
            RelativeWindow::Month => "month".to_string(),
            RelativeWindow::LastDays(n) => format!("last {} days", n),
            RelativeWindow::NextDays(n) => format!("next {} days", n),
        }
    }

    /// Inverse of [`as_filter_value`](Self::as_filter_value), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.trim().to_lowercase();
        match lower.as_str() {
            "today" => return Some(RelativeWindow::Today),
            "yesterday" => return Some(RelativeWindow::Yesterday),
            "week" => return Some(RelativeWindow::Week),
            "month" => return Some(RelativeWindow::Month),
            _ => {}
        }
        let mut words = lower.split_whitespace();
        let (direction, count, unit) = (words.next()?, words.next()?, words.next()?);
        if words.next().is_some() || !(unit == "days" || unit == "day") {
            return None;
        }
        let n = count.parse::<u32>().ok()?;
        match direction {
            "last" => Some(RelativeWindow::LastDays(n)),
            "next" => Some(RelativeWindow::NextDays(n)),
            _ => None,
        }
    }
}

/// Preset date ranges offered next to the activity report's date picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickDateFilters {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub this_week_start: NaiveDate,
    pub this_week_end: NaiveDate,
    pub last_week_start: NaiveDate,
    pub last_week_end: NaiveDate,
    pub this_month_start: NaiveDate,
    pub this_month_end: NaiveDate,
}

/// Weeks start on Sunday.
pub fn quick_date_filters(today: NaiveDate) -> QuickDateFilters {
    let this_week_start = days_before(today, u64::from(today.weekday().num_days_from_sunday()));
    QuickDateFilters {
        today,
        yesterday: days_before(today, 1),
        this_week_start,
        this_week_end: today,
        last_week_start: days_before(this_week_start, 7),
        last_week_end: days_before(this_week_start, 1),
        this_month_start: today.with_day(1).unwrap_or(today),
        this_month_end: today,
    }
}
