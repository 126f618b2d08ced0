use serde::Serialize;

use crate::analytics::ranking::{rank_reps, LeaderboardRow};
use crate::types::SalesRep;

pub const HUNTER_OF_THE_MONTH: &str = "Hunter of the Month";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub row: LeaderboardRow,
    /// Set on the rank-1 rep only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
}

impl LeaderboardEntry {
    pub fn is_hunter_of_the_month(&self) -> bool {
        self.badge == Some(HUNTER_OF_THE_MONTH)
    }
}

/// Sums across every rep, not just the ranked page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardTotals {
    pub leads_contacted: u64,
    pub meetings_booked: u64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardEntry>,
    pub totals: LeaderboardTotals,
}

pub fn build_leaderboard(reps: &[SalesRep]) -> Leaderboard {
    let rows = rank_reps(reps)
        .into_iter()
        .map(|row| LeaderboardEntry {
            badge: (row.rank == 1).then_some(HUNTER_OF_THE_MONTH),
            row,
        })
        .collect();

    let totals = reps.iter().fold(LeaderboardTotals::default(), |mut acc, rep| {
        acc.leads_contacted += u64::from(rep.leads_contacted);
        acc.meetings_booked += u64::from(rep.meetings_booked);
        acc.total_revenue += rep.total_revenue;
        acc
    });

    Leaderboard { rows, totals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::rep;

    #[test]
    fn test_rank_one_is_hunter_of_the_month() {
        let board = build_leaderboard(&[
            rep(1, "Maya", 10, 4, 3, 48000.0),
            rep(2, "Omar", 2, 1, 1, 12000.0),
            rep(3, "Ines", 0, 0, 0, 0.0),
        ]);
        let order: Vec<&str> = board.rows.iter().map(|e| e.row.rep.name.as_str()).collect();
        assert_eq!(order, vec!["Omar", "Maya", "Ines"]);
        assert!(board.rows[0].is_hunter_of_the_month());
        assert!(board.rows[1..].iter().all(|e| e.badge.is_none()));
    }

    #[test]
    fn test_totals_cover_all_reps() {
        let board = build_leaderboard(&[
            rep(1, "Maya", 10, 4, 3, 48000.0),
            rep(2, "Omar", 2, 1, 1, 12000.5),
        ]);
        assert_eq!(board.totals.leads_contacted, 12);
        assert_eq!(board.totals.meetings_booked, 5);
        assert_eq!(board.totals.total_revenue, 60000.5);
    }

    #[test]
    fn test_empty_board() {
        assert_eq!(build_leaderboard(&[]), Leaderboard::default());
    }

    #[test]
    fn test_serialized_row_is_flat() {
        let board = build_leaderboard(&[rep(2, "Omar", 2, 1, 1, 12000.0)]);
        let value = serde_json::to_value(&board.rows[0]).unwrap();
        assert_eq!(value["name"], "Omar");
        assert_eq!(value["rank"], 1);
        assert_eq!(value["badge"], HUNTER_OF_THE_MONTH);
    }
}
