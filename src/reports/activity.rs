//! Website-URL activity report: which lead URLs were added, when and by whom.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::analytics::calendar::{day_end_utc, day_start_utc, local_date};
use crate::analytics::distribution::{distribution_by, round_half_up};
use crate::gateway::{FetchQuery, Predicate, RecordId};
use crate::mapper::format_timestamp;
use crate::mapper::leads::{ADDED_BY, CATEGORY, CREATED_AT, WEBSITE_URL};
use crate::types::Lead;

/// Activity report filters. A complete date range takes precedence over a single day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub added_by: Option<RecordId>,
    pub search_term: Option<String>,
}

impl ActivityFilters {
    /// Inclusive calendar-day bounds selected by the date filters.
    fn day_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date, self.date) {
            (Some(start), Some(end), _) => Some((start, end)),
            (_, _, Some(day)) => Some((day, day)),
            _ => None,
        }
    }

    fn search(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Narrow `query` to the filters. Day bounds are sent as instants in `tz`.
    pub fn apply(&self, mut query: FetchQuery, tz: Tz) -> FetchQuery {
        if let Some((start, end)) = self.day_range() {
            query = query
                .filter(Predicate::at_least(
                    CREATED_AT,
                    format_timestamp(day_start_utc(start, tz)),
                ))
                .filter(Predicate::at_most(
                    CREATED_AT,
                    format_timestamp(day_end_utc(end, tz)),
                ));
        }
        if let Some(rep_id) = self.added_by {
            query = query.filter(Predicate::equal_to(ADDED_BY, rep_id));
        }
        if let Some(term) = self.search() {
            query = query.search_any(&[WEBSITE_URL, CATEGORY], term);
        }
        query
    }

    /// Client-side check of the same filters.
    pub fn matches(&self, lead: &Lead, tz: Tz) -> bool {
        if let Some((start, end)) = self.day_range() {
            let day = local_date(lead.created_at, tz);
            if day < start || day > end {
                return false;
            }
        }
        if let Some(rep_id) = self.added_by {
            if lead.added_by_id() != Some(rep_id) {
                return false;
            }
        }
        if let Some(term) = self.search() {
            let term = term.to_lowercase();
            if !lead.website_url.to_lowercase().contains(&term)
                && !lead.category.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub id: RecordId,
    pub name: String,
    pub product_name: String,
    pub website_url: String,
    pub category: String,
    pub status: String,
    pub arr: f64,
    pub funding_type: String,
    pub team_size: String,
    pub created_at: DateTime<Utc>,
    pub added_by: Option<RecordId>,
    pub added_by_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub total_urls: u32,
    pub total_arr: f64,
    pub by_status: BTreeMap<String, u32>,
    pub by_category: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityReport {
    pub data: Vec<ActivityRow>,
    pub summary: ActivitySummary,
}

/// Strip one trailing slash.
pub fn clean_website_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

pub fn build_activity_report(leads: &[Lead]) -> ActivityReport {
    let data = leads
        .iter()
        .map(|lead| ActivityRow {
            id: lead.id,
            name: lead.name.clone(),
            product_name: lead.product_name.clone(),
            website_url: clean_website_url(&lead.website_url).to_string(),
            category: lead.category.clone(),
            status: lead.status.clone(),
            arr: lead.arr,
            funding_type: lead.funding_type.clone(),
            team_size: lead.team_size.clone(),
            created_at: lead.created_at,
            added_by: lead.added_by_id(),
            added_by_name: lead.added_by_name().to_string(),
        })
        .collect();

    ActivityReport {
        data,
        summary: ActivitySummary {
            total_urls: leads.len() as u32,
            total_arr: leads.iter().map(|l| l.arr).sum(),
            by_status: distribution_by(leads, |l| l.status.clone()),
            by_category: distribution_by(leads, |l| l.category.clone()),
        },
    }
}

/// Spreadsheet row of the activity export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Website URL")]
    pub website_url: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Team Size")]
    pub team_size: String,
    #[serde(rename = "ARR")]
    pub arr: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Funding Type")]
    pub funding_type: String,
    #[serde(rename = "Added By")]
    pub added_by: String,
    #[serde(rename = "Date Added")]
    pub date_added: String,
}

/// ARR in millions with one decimal, e.g. `$1.2M`.
pub fn format_arr(arr: f64) -> String {
    let tenths = round_half_up(arr / 100_000.0);
    format!("${:.1}M", tenths as f64 / 10.0)
}

pub fn export_rows(report: &ActivityReport, tz: Tz) -> Vec<ExportRow> {
    report
        .data
        .iter()
        .map(|row| {
            let day = local_date(row.created_at, tz);
            ExportRow {
                website_url: clean_website_url(&row.website_url).to_string(),
                category: row.category.clone(),
                team_size: row.team_size.clone(),
                arr: format_arr(row.arr),
                status: row.status.clone(),
                funding_type: row.funding_type.clone(),
                added_by: row.added_by_name.clone(),
                date_added: format!("{}/{}/{}", day.month(), day.day(), day.year()),
            }
        })
        .collect()
}
