//! Dashboard views: each fetches its inputs concurrently, then hands them to the report
//! assembler. Any failed or timed-out fetch yields the view's empty value.

use chrono::NaiveDate;
use chrono_tz::Tz;

use super::leads::by_rep;
use super::reps::fetch_sales_reps;
use super::{degrade, fetch_records, ReportContext};
use crate::analytics::calendar::{
    day_end_utc, day_start_utc, quick_date_filters, QuickDateFilters, RelativeWindow,
    MAX_WINDOW_DAYS,
};
use crate::error::CrmError;
use crate::gateway::{FetchQuery, Predicate, RecordGateway, RecordId, SortType};
use crate::mapper::format_timestamp;
use crate::mapper::leads::{CREATED_AT, FOLLOW_UP_DATE};
use crate::reports::activity::ExportRow;
use crate::reports::{
    build_activity_report, build_daily_leads_chart, build_daily_rep_report,
    build_follow_up_queue, build_leaderboard, build_leads_analytics, build_leads_metrics,
    build_user_performance, export_rows, ActivityFilters, ActivityReport, DailyLeadsChart,
    FollowUp, Leaderboard, LeadsAnalytics, LeadsMetrics, RepDailyActivity, UserPerformance,
};
use crate::types::Lead;

/// Narrow to leads created inside `window`, bounds taken in `tz`.
fn created_within(
    query: FetchQuery,
    window: RelativeWindow,
    today: NaiveDate,
    tz: Tz,
) -> FetchQuery {
    let (first, last) = window.bounds(today);
    query
        .filter(Predicate::at_least(
            CREATED_AT,
            format_timestamp(day_start_utc(first, tz)),
        ))
        .filter(Predicate::at_most(
            CREATED_AT,
            format_timestamp(day_end_utc(last, tz)),
        ))
}

/// `days`, capped at [`MAX_WINDOW_DAYS`].
fn clamp_window(what: &str, days: u32) -> u32 {
    if days > MAX_WINDOW_DAYS {
        log::warn!(
            "{} window of {} days exceeds {}, clamping",
            what,
            days,
            MAX_WINDOW_DAYS
        );
    }
    days.min(MAX_WINDOW_DAYS)
}

async fn fetch_leads(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    narrow: impl FnOnce(FetchQuery) -> FetchQuery,
) -> Result<Vec<Lead>, CrmError> {
    fetch_records::<Lead>(gateway, ctx, |q| narrow(q.order(CREATED_AT, SortType::Desc))).await
}

/// Reps ranked by performance score, with the month's top hunter flagged.
pub async fn leaderboard(gateway: &dyn RecordGateway, ctx: &ReportContext) -> Leaderboard {
    let result = fetch_sales_reps(gateway, ctx)
        .await
        .map(|reps| build_leaderboard(&reps));
    degrade("leaderboard", result, Leaderboard::default())
}

/// Today's new leads per rep.
pub async fn daily_report(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
) -> Vec<RepDailyActivity> {
    let (today, tz) = (ctx.today(), ctx.tz());
    let result = tokio::try_join!(
        fetch_leads(gateway, ctx, |q| {
            created_within(q, RelativeWindow::Today, today, tz)
        }),
        fetch_sales_reps(gateway, ctx),
    )
    .map(|(leads, reps)| build_daily_rep_report(&leads, &reps, today, tz));
    degrade("daily report", result, Vec::new())
}

/// Leads due for follow-up within the configured horizon.
pub async fn follow_ups(gateway: &dyn RecordGateway, ctx: &ReportContext) -> Vec<FollowUp> {
    let today = ctx.today();
    let horizon = clamp_window("Follow-up", ctx.reports.follow_up_horizon_days);
    let (first, last) = RelativeWindow::NextDays(horizon).bounds(today);
    let result = fetch_leads(gateway, ctx, |q| {
        q.filter(Predicate::at_least(
            FOLLOW_UP_DATE,
            first.format("%Y-%m-%d").to_string(),
        ))
        .filter(Predicate::at_most(
            FOLLOW_UP_DATE,
            last.format("%Y-%m-%d").to_string(),
        ))
    })
    .await
    .map(|leads| build_follow_up_queue(&leads, today, horizon));
    degrade("follow-ups", result, Vec::new())
}

/// Intake counts and distributions, for one rep or everyone.
pub async fn leads_metrics(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    rep_id: Option<RecordId>,
) -> LeadsMetrics {
    let result = fetch_leads(gateway, ctx, |q| by_rep(q, rep_id))
        .await
        .map(|leads| build_leads_metrics(&leads, ctx.today(), ctx.tz()));
    degrade("leads metrics", result, LeadsMetrics::default())
}

/// Leads created in `period` (all time when `None`), for one rep or everyone.
pub async fn leads_analytics(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    period: Option<RelativeWindow>,
    rep_id: Option<RecordId>,
) -> LeadsAnalytics {
    let (today, tz) = (ctx.today(), ctx.tz());
    let result = fetch_leads(gateway, ctx, |q| {
        let q = match period {
            Some(window) => created_within(q, window, today, tz),
            None => q,
        };
        by_rep(q, rep_id)
    })
    .await
    .map(|leads| build_leads_analytics(&leads, period, today, tz));
    degrade("leads analytics", result, LeadsAnalytics::default())
}

/// New leads per day over `days` (default: the configured chart window).
pub async fn daily_chart(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    days: Option<u32>,
    rep_id: Option<RecordId>,
) -> DailyLeadsChart {
    let days = clamp_window("Chart", days.unwrap_or(ctx.reports.chart_window_days));
    if days == 0 {
        return DailyLeadsChart::default();
    }
    let (today, tz) = (ctx.today(), ctx.tz());
    let result = fetch_leads(gateway, ctx, |q| {
        by_rep(created_within(q, RelativeWindow::LastDays(days), today, tz), rep_id)
    })
    .await
    .map(|leads| build_daily_leads_chart(&leads, days, today, tz));
    degrade("daily leads chart", result, DailyLeadsChart::default())
}

pub async fn user_performance(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
) -> Vec<UserPerformance> {
    let result = tokio::try_join!(
        fetch_sales_reps(gateway, ctx),
        fetch_leads(gateway, ctx, |q| q),
    )
    .map(|(reps, leads)| build_user_performance(&reps, &leads, ctx.today(), ctx.tz()));
    degrade("user performance", result, Vec::new())
}

/// Website-URL activity for `filters`. Filters are applied by the store and again here.
pub async fn website_activity(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    filters: &ActivityFilters,
) -> ActivityReport {
    let tz = ctx.tz();
    let result = fetch_leads(gateway, ctx, |q| filters.apply(q, tz))
        .await
        .map(|leads| {
            let kept: Vec<Lead> = leads.into_iter().filter(|l| filters.matches(l, tz)).collect();
            build_activity_report(&kept)
        });
    degrade("website activity", result, ActivityReport::default())
}

/// Spreadsheet rows for the activity report under `filters`.
pub async fn export_activity(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    filters: &ActivityFilters,
) -> Vec<ExportRow> {
    let report = website_activity(gateway, ctx, filters).await;
    export_rows(&report, ctx.tz())
}

pub fn quick_filters(ctx: &ReportContext) -> QuickDateFilters {
    quick_date_filters(ctx.today())
}
