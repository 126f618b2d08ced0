//! Record services and the dashboard report service.
//!
//! Every call takes the gateway explicitly. Reads degrade to an empty value and log a
//! warning; writes log the failure and propagate it.

pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod leads;
pub mod reps;
pub mod team;

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;

use crate::analytics::calendar::{parse_timezone, ReportClock};
use crate::error::CrmError;
use crate::gateway::{
    expect_deleted, expect_fetched, expect_found, expect_written, within, FetchQuery, RawRecord,
    RecordGateway, RecordId,
};
use crate::mapper::{format_timestamp, normalize, normalize_all, FieldMap, Mapped};
use crate::types::{Config, ReportConfig};

/// Per-call settings shared by every service: the pinned clock, the gateway call
/// timeout and report tuning.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub clock: ReportClock,
    pub call_timeout: Duration,
    pub reports: ReportConfig,
}

impl ReportContext {
    pub fn new(clock: ReportClock, call_timeout: Duration, reports: ReportConfig) -> Self {
        Self {
            clock,
            call_timeout,
            reports,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ReportClock::system(parse_timezone(&config.timezone)),
            Duration::from_secs(config.gateway.request_timeout_secs),
            config.reports.clone(),
        )
    }

    pub fn tz(&self) -> Tz {
        self.clock.tz()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `now` in stored form, for `created_at_c` / `updated_at_c` stamps.
    pub(crate) fn stamp(&self) -> Value {
        Value::from(format_timestamp(self.now()))
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }
}

/// Use `result`, or log why `what` is unavailable and fall back.
pub(crate) fn degrade<T>(what: &str, result: Result<T, CrmError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to load {}: {}", what, e);
            fallback
        }
    }
}

/// Fetch and normalize every record matching `query`, plus the store's total when given.
pub(crate) async fn fetch_all<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    query: &FetchQuery,
) -> Result<(Vec<T>, Option<u64>), CrmError> {
    log::debug!(
        "fetch {} ({} predicates, {} groups)",
        T::COLLECTION,
        query.predicates.len(),
        query.where_groups.len()
    );
    let response = within(ctx.call_timeout, gateway.fetch(T::COLLECTION, query)).await?;
    let (raws, total) = expect_fetched(T::COLLECTION, response)?;
    Ok((normalize_all(&raws), total))
}

/// Fetch with the collection's default field selection plus `narrow`.
pub(crate) async fn fetch_records<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    narrow: impl FnOnce(FetchQuery) -> FetchQuery,
) -> Result<Vec<T>, CrmError> {
    let query = narrow(FetchQuery::select(T::FIELDS));
    fetch_all(gateway, ctx, &query).await.map(|(records, _)| records)
}

pub(crate) async fn get_record<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<Mapped<T>, CrmError> {
    let response = within(ctx.call_timeout, gateway.get_by_id(T::COLLECTION, id)).await?;
    let raw = expect_found(T::COLLECTION, id, response)?;
    Ok(normalize(&raw))
}

pub(crate) async fn create_raw<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    body: RawRecord,
) -> Result<T, CrmError> {
    let written = within(ctx.call_timeout, gateway.create(T::COLLECTION, vec![body]))
        .await
        .and_then(|response| expect_written(T::COLLECTION, "create", response))
        .map_err(|e| {
            log::error!("Failed to create {}: {}", T::COLLECTION.noun(), e);
            e
        })?;
    Ok(normalize::<T>(&written).into_inner())
}

pub(crate) async fn update_raw<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    body: RawRecord,
) -> Result<T, CrmError> {
    let written = within(ctx.call_timeout, gateway.update(T::COLLECTION, vec![body]))
        .await
        .and_then(|response| expect_written(T::COLLECTION, "update", response))
        .map_err(|e| {
            log::error!("Failed to update {}: {}", T::COLLECTION.noun(), e);
            e
        })?;
    Ok(normalize::<T>(&written).into_inner())
}

pub(crate) async fn delete_record<T: FieldMap>(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    within(ctx.call_timeout, gateway.delete(T::COLLECTION, &[id]))
        .await
        .and_then(|response| expect_deleted(T::COLLECTION, response))
        .map_err(|e| {
            log::error!("Failed to delete {} {}: {}", T::COLLECTION.noun(), id, e);
            e
        })
}

#[cfg(test)]
pub(crate) fn test_context() -> ReportContext {
    ReportContext::new(
        crate::test_utils::clock(),
        Duration::from_millis(200),
        ReportConfig::default(),
    )
}
