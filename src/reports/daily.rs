use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::analytics::calendar::local_date;
use crate::gateway::RecordId;
use crate::types::{Lead, SalesRep};

/// Reps adding fewer leads than this in a day are flagged.
pub const LOW_PERFORMANCE_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLead {
    pub id: RecordId,
    pub name: String,
    pub product_name: String,
    pub website_url: String,
    pub category: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Lead> for DailyLead {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            product_name: lead.product_name.clone(),
            website_url: lead.website_url.clone(),
            category: lead.category.clone(),
            status: lead.status.clone(),
            created_at: lead.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepDailyActivity {
    pub sales_rep: String,
    pub sales_rep_id: RecordId,
    pub leads: Vec<DailyLead>,
    pub lead_count: u32,
    pub low_performance: bool,
}

/// Leads created on `today` (in `tz`), grouped by the rep who added them.
///
/// Every rep gets a row, including reps with no leads. Leads added by someone outside
/// `reps`, or by nobody, are left out. Rows are ordered by lead count, busiest first,
/// keeping rep order on ties.
pub fn build_daily_rep_report(
    leads: &[Lead],
    reps: &[SalesRep],
    today: NaiveDate,
    tz: Tz,
) -> Vec<RepDailyActivity> {
    let mut rows: Vec<RepDailyActivity> = reps
        .iter()
        .map(|rep| {
            let todays: Vec<DailyLead> = leads
                .iter()
                .filter(|lead| lead.added_by_id() == Some(rep.id))
                .filter(|lead| local_date(lead.created_at, tz) == today)
                .map(DailyLead::from)
                .collect();
            let lead_count = todays.len() as u32;
            RepDailyActivity {
                sales_rep: rep.name.clone(),
                sales_rep_id: rep.id,
                leads: todays,
                lead_count,
                low_performance: lead_count < LOW_PERFORMANCE_THRESHOLD,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.lead_count.cmp(&a.lead_count));
    rows
}
