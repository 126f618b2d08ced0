//! Report assembler: display-ready structures built from normalized record snapshots.
//!
//! Every builder is a stateless transform. Fetching, timeouts and degradation live in
//! `services::dashboard`.

pub mod activity;
pub mod daily;
pub mod follow_ups;
pub mod leaderboard;
pub mod metrics;
pub mod performance;

pub use activity::{build_activity_report, export_rows, ActivityFilters, ActivityReport};
pub use daily::{build_daily_rep_report, RepDailyActivity};
pub use follow_ups::{build_follow_up_queue, FollowUp};
pub use leaderboard::{build_leaderboard, Leaderboard};
pub use metrics::{
    build_daily_leads_chart, build_leads_analytics, build_leads_metrics, DailyLeadsChart,
    LeadsAnalytics, LeadsMetrics,
};
pub use performance::{build_user_performance, UserPerformance};
