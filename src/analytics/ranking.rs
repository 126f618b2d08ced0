//! Performance-score ranking of sales reps (pure math, no I/O).

use serde::Serialize;

use crate::types::SalesRep;

const CONVERSION_WEIGHT: f64 = 4.0;
const DEALS_WEIGHT: f64 = 3.0;
const MEETINGS_WEIGHT: f64 = 2.0;
const LEADS_WEIGHT: f64 = 1.0;

/// A rep with its computed score and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    #[serde(flatten)]
    pub rep: SalesRep,
    pub score: f64,
    pub rank: u32,
}

/// `conversionRate×4 + dealsClosed×3 + meetingsBooked×2 + leadsContacted×1`
pub fn performance_score(rep: &SalesRep) -> f64 {
    rep.conversion_rate * CONVERSION_WEIGHT
        + f64::from(rep.deals_closed) * DEALS_WEIGHT
        + f64::from(rep.meetings_booked) * MEETINGS_WEIGHT
        + f64::from(rep.leads_contacted) * LEADS_WEIGHT
}

/// Rank reps by descending score. Exact ties keep their input order.
pub fn rank_reps(reps: &[SalesRep]) -> Vec<LeaderboardRow> {
    let mut scored: Vec<(SalesRep, f64)> = reps
        .iter()
        .map(|rep| (rep.clone(), performance_score(rep)))
        .collect();
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .zip(1u32..)
        .map(|((rep, score), rank)| LeaderboardRow { rep, score, rank })
        .collect()
}
