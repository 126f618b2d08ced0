//! Lead intake metrics and the daily new-leads chart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

use crate::analytics::buckets::{bucket_by_day, count_in_window};
use crate::analytics::calendar::{local_date, RelativeWindow};
use crate::analytics::distribution::{distribution_by, percent_change};
use crate::types::Lead;

pub const NEW_LEADS_SERIES: &str = "New Leads";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCount {
    pub count: u32,
    /// Percent change against the previous period, where one is defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<i64>,
    pub label: &'static str,
}

impl PeriodCount {
    fn new(count: u32, label: &'static str) -> Self {
        Self {
            count,
            trend: None,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodMetrics {
    pub today: PeriodCount,
    pub yesterday: PeriodCount,
    pub week: PeriodCount,
    pub month: PeriodCount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadsMetrics {
    pub metrics: PeriodMetrics,
    pub status_distribution: BTreeMap<String, u32>,
    pub category_distribution: BTreeMap<String, u32>,
    pub total_leads: u32,
}

impl Default for LeadsMetrics {
    fn default() -> Self {
        Self {
            metrics: PeriodMetrics {
                today: PeriodCount {
                    trend: Some(0),
                    ..PeriodCount::new(0, "Today")
                },
                yesterday: PeriodCount::new(0, "Yesterday"),
                week: PeriodCount::new(0, "This Week"),
                month: PeriodCount::new(0, "This Month"),
            },
            status_distribution: BTreeMap::new(),
            category_distribution: BTreeMap::new(),
            total_leads: 0,
        }
    }
}

/// Intake counts per period plus status and category histograms over all of `leads`.
pub fn build_leads_metrics(leads: &[Lead], today: NaiveDate, tz: Tz) -> LeadsMetrics {
    let count = |window| count_in_window(leads, window, today, tz);
    let today_count = count(RelativeWindow::Today);
    let yesterday_count = count(RelativeWindow::Yesterday);

    LeadsMetrics {
        metrics: PeriodMetrics {
            today: PeriodCount {
                trend: Some(percent_change(
                    i64::from(today_count),
                    i64::from(yesterday_count),
                )),
                ..PeriodCount::new(today_count, "Today")
            },
            yesterday: PeriodCount::new(yesterday_count, "Yesterday"),
            week: PeriodCount::new(count(RelativeWindow::Week), "This Week"),
            month: PeriodCount::new(count(RelativeWindow::Month), "This Month"),
        },
        status_distribution: distribution_by(leads, |l| l.status.clone()),
        category_distribution: distribution_by(leads, |l| l.category.clone()),
        total_leads: leads.len() as u32,
    }
}

/// A lead plus the display name of the rep who added it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLead {
    #[serde(flatten)]
    pub lead: Lead,
    pub added_by_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadsAnalytics {
    pub leads: Vec<PeriodLead>,
    pub total_count: u32,
}

/// Leads created inside `period`, or all of them when `period` is `None`. Input order is kept.
pub fn build_leads_analytics(
    leads: &[Lead],
    period: Option<RelativeWindow>,
    today: NaiveDate,
    tz: Tz,
) -> LeadsAnalytics {
    let leads: Vec<PeriodLead> = leads
        .iter()
        .filter(|lead| {
            period.map_or(true, |window| {
                window.contains(today, local_date(lead.created_at, tz))
            })
        })
        .map(|lead| PeriodLead {
            added_by_name: lead.added_by_name().to_string(),
            lead: lead.clone(),
        })
        .collect();
    LeadsAnalytics {
        total_count: leads.len() as u32,
        leads,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub count: u32,
    pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLeadsChart {
    pub chart_data: Vec<ChartPoint>,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl Default for DailyLeadsChart {
    fn default() -> Self {
        Self {
            chart_data: Vec::new(),
            categories: Vec::new(),
            series: vec![ChartSeries {
                name: NEW_LEADS_SERIES.to_string(),
                data: Vec::new(),
            }],
        }
    }
}

/// New leads per day over the trailing `window_days`, labelled like "Oct 19".
pub fn build_daily_leads_chart(
    leads: &[Lead],
    window_days: u32,
    today: NaiveDate,
    tz: Tz,
) -> DailyLeadsChart {
    let chart_data: Vec<ChartPoint> = bucket_by_day(leads, window_days, today, tz)
        .into_iter()
        .map(|bucket| ChartPoint {
            date: bucket.date,
            count: bucket.count,
            formatted_date: bucket.date.format("%b %-d").to_string(),
        })
        .collect();

    DailyLeadsChart {
        categories: chart_data.iter().map(|p| p.formatted_date.clone()).collect(),
        series: vec![ChartSeries {
            name: NEW_LEADS_SERIES.to_string(),
            data: chart_data.iter().map(|p| p.count).collect(),
        }],
        chart_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::lead;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn with_status(mut l: Lead, status: &str, category: &str) -> Lead {
        l.status = status.to_string();
        l.category = category.to_string();
        l
    }

    #[test]
    fn test_period_counts_and_trend() {
        let leads = vec![
            with_status(lead(1, "https://a.io", "2026-10-19T08:00:00Z", None), "Connected", "AI"),
            with_status(lead(2, "https://b.io", "2026-10-19T09:00:00Z", None), "Connected", "AI"),
            with_status(lead(3, "https://c.io", "2026-10-19T10:00:00Z", None), "Closed", "SaaS"),
            with_status(lead(4, "https://d.io", "2026-10-18T10:00:00Z", None), "Closed", "SaaS"),
            with_status(lead(5, "https://e.io", "2026-10-12T00:00:00Z", None), "Keep an Eye", ""),
            with_status(lead(6, "https://f.io", "2026-10-11T23:59:59Z", None), "Keep an Eye", ""),
            with_status(lead(7, "https://g.io", "2026-09-19T00:00:00Z", None), "Keep an Eye", ""),
            with_status(lead(8, "https://h.io", "2026-09-18T23:59:59Z", None), "Keep an Eye", ""),
        ];
        let metrics = build_leads_metrics(&leads, today(), chrono_tz::UTC);
        assert_eq!(metrics.metrics.today.count, 3);
        assert_eq!(metrics.metrics.today.trend, Some(200));
        assert_eq!(metrics.metrics.yesterday.count, 1);
        assert_eq!(metrics.metrics.week.count, 5);
        assert_eq!(metrics.metrics.month.count, 7);
        assert_eq!(metrics.total_leads, 8);
        assert_eq!(metrics.status_distribution["Keep an Eye"], 4);
        assert_eq!(metrics.category_distribution["AI"], 2);
        assert_eq!(metrics.category_distribution[""], 4);
    }

    #[test]
    fn test_empty_metrics_match_default() {
        assert_eq!(
            build_leads_metrics(&[], today(), chrono_tz::UTC),
            LeadsMetrics::default()
        );
    }

    #[test]
    fn test_leads_analytics_by_period() {
        let leads = vec![
            lead(1, "https://a.io", "2026-10-19T08:00:00Z", Some((3, "Maya"))),
            lead(2, "https://b.io", "2026-10-18T08:00:00Z", None),
            lead(3, "https://c.io", "2026-10-10T08:00:00Z", Some((2, "Omar"))),
        ];
        let week =
            build_leads_analytics(&leads, Some(RelativeWindow::Week), today(), chrono_tz::UTC);
        assert_eq!(week.total_count, 2);
        let names: Vec<&str> = week.leads.iter().map(|l| l.added_by_name.as_str()).collect();
        assert_eq!(names, vec!["Maya", "Unknown"]);

        let all = build_leads_analytics(&leads, None, today(), chrono_tz::UTC);
        assert_eq!(all.total_count, 3);
        assert_eq!(all.leads[2].lead.id, 3);

        let value = serde_json::to_value(&week).unwrap();
        assert_eq!(value["totalCount"], 2);
        assert_eq!(value["leads"][0]["websiteUrl"], "https://a.io");
        assert_eq!(value["leads"][0]["addedByName"], "Maya");
    }

    #[test]
    fn test_chart_labels_and_series() {
        let leads = vec![
            lead(1, "https://a.io", "2026-10-19T08:00:00Z", None),
            lead(2, "https://b.io", "2026-10-17T08:00:00Z", None),
            lead(3, "https://c.io", "2026-10-17T22:00:00Z", None),
        ];
        let chart = build_daily_leads_chart(&leads, 3, today(), chrono_tz::UTC);
        assert_eq!(chart.categories, vec!["Oct 17", "Oct 18", "Oct 19"]);
        assert_eq!(chart.series[0].name, "New Leads");
        assert_eq!(chart.series[0].data, vec![2, 0, 1]);
        assert_eq!(chart.chart_data.len(), 3);
    }

    #[test]
    fn test_chart_single_digit_day_label() {
        let day = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let chart = build_daily_leads_chart(&[], 1, day, chrono_tz::UTC);
        assert_eq!(chart.categories, vec!["Nov 3"]);
    }
}
