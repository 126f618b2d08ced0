use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;

use crate::analytics::buckets::count_in_window;
use crate::analytics::calendar::RelativeWindow;
use crate::analytics::distribution::round_half_up;
use crate::gateway::RecordId;
use crate::types::{Lead, SalesRep};

/// Per-rep lead intake next to the rep's pipeline counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPerformance {
    pub id: RecordId,
    pub name: String,
    pub leads_contacted: u32,
    pub meetings_booked: u32,
    pub deals_closed: u32,
    pub total_revenue: f64,
    pub total_leads: u32,
    pub today_leads: u32,
    pub week_leads: u32,
    pub month_leads: u32,
    /// Deals closed per meeting booked, as a whole percentage.
    pub meeting_conversion: i64,
}

pub fn meeting_conversion(deals_closed: u32, meetings_booked: u32) -> i64 {
    if meetings_booked == 0 {
        return 0;
    }
    round_half_up(f64::from(deals_closed) / f64::from(meetings_booked) * 100.0)
}

/// One row per rep, most leads added first (rep order kept on ties).
pub fn build_user_performance(
    reps: &[SalesRep],
    leads: &[Lead],
    today: NaiveDate,
    tz: Tz,
) -> Vec<UserPerformance> {
    let mut rows: Vec<UserPerformance> = reps
        .iter()
        .map(|rep| {
            let own: Vec<Lead> = leads
                .iter()
                .filter(|l| l.added_by_id() == Some(rep.id))
                .cloned()
                .collect();
            UserPerformance {
                id: rep.id,
                name: rep.name.clone(),
                leads_contacted: rep.leads_contacted,
                meetings_booked: rep.meetings_booked,
                deals_closed: rep.deals_closed,
                total_revenue: rep.total_revenue,
                total_leads: own.len() as u32,
                today_leads: count_in_window(&own, RelativeWindow::Today, today, tz),
                week_leads: count_in_window(&own, RelativeWindow::Week, today, tz),
                month_leads: count_in_window(&own, RelativeWindow::Month, today, tz),
                meeting_conversion: meeting_conversion(rep.deals_closed, rep.meetings_booked),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_leads.cmp(&a.total_leads));
    rows
}
