use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::calendar::RelativeWindow;
use crate::gateway::RecordId;
use crate::types::Lead;

pub const DEFAULT_FOLLOW_UP_HORIZON_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: RecordId,
    pub name: String,
    pub website_url: String,
    pub category: String,
    pub follow_up_date: NaiveDate,
    pub status: String,
}

/// Leads due for follow-up between `today` and `today + horizon_days`, inclusive,
/// soonest first.
pub fn build_follow_up_queue(leads: &[Lead], today: NaiveDate, horizon_days: u32) -> Vec<FollowUp> {
    let window = RelativeWindow::NextDays(horizon_days);
    let mut queue: Vec<FollowUp> = leads
        .iter()
        .filter_map(|lead| {
            let due = lead.follow_up_date?;
            window.contains(today, due).then(|| FollowUp {
                id: lead.id,
                name: lead.name.clone(),
                website_url: lead.website_url.clone(),
                category: lead.category.clone(),
                follow_up_date: due,
                status: lead.status.clone(),
            })
        })
        .collect();
    queue.sort_by_key(|f| f.follow_up_date);
    queue
}
