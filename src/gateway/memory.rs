//! In-process record gateway.
//!
//! Evaluates the full fetch query language against records held in memory, with relative
//! and day-level date predicates resolved in the clock's pinned timezone. Lookup fields
//! stored as bare ids are expanded to `{ "Id", "Name" }` on read, as the hosted store does.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use super::query::{ConditionGroup, GroupOperator, Operator, SortType, SubOperator};
use super::{
    Collection, FetchQuery, FetchResponse, MutationResponse, RawRecord, RecordGateway, RecordId,
    RecordResponse, RecordResult,
};
use crate::analytics::calendar::{local_date, RelativeWindow, ReportClock};
use crate::error::CrmError;
use crate::mapper::{parse_timestamp, ID, NAME};

/// Lookup fields resolved against another collection on read.
const LOOKUPS: &[(Collection, &str, Collection)] = &[
    (Collection::Lead, "added_by_c", Collection::SalesRep),
    (Collection::Deal, "assigned_rep_c", Collection::SalesRep),
    (Collection::Contact, "assigned_rep_c", Collection::SalesRep),
];

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Collection, Vec<RawRecord>>,
    refusals: HashMap<Collection, String>,
    next_id: RecordId,
}

impl Tables {
    fn rows(&self, collection: Collection) -> &[RawRecord] {
        self.rows.get(&collection).map(Vec::as_slice).unwrap_or(&[])
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }
}

pub struct InMemoryGateway {
    clock: ReportClock,
    latency: Option<Duration>,
    tables: Mutex<Tables>,
}

impl InMemoryGateway {
    pub fn new(clock: ReportClock) -> Self {
        Self {
            clock,
            latency: None,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Build a gateway from a fixture document keyed by table name:
    /// `{ "lead_c": [ {..}, .. ], "sales_rep_c": [ .. ] }`.
    pub fn from_fixture(fixture: &Value, clock: ReportClock) -> Result<Self, CrmError> {
        let tables = fixture.as_object().ok_or_else(|| {
            CrmError::ParseError("Fixture must be an object keyed by table name".to_string())
        })?;
        let gateway = Self::new(clock);
        for (table, rows) in tables {
            let collection = Collection::from_table(table).ok_or_else(|| {
                CrmError::ParseError(format!("Unknown table in fixture: {}", table))
            })?;
            let records = rows
                .as_array()
                .map(|items| items.iter().filter_map(|r| r.as_object().cloned()).collect())
                .unwrap_or_default();
            gateway.seed(collection, records);
        }
        Ok(gateway)
    }

    pub fn load_fixture(path: &Path, clock: ReportClock) -> Result<Self, CrmError> {
        let content = std::fs::read_to_string(path)?;
        let fixture: Value = serde_json::from_str(&content)?;
        Self::from_fixture(&fixture, clock)
    }

    /// Insert records as stored. Records without an `Id` get the next free one.
    pub fn seed(&self, collection: Collection, records: Vec<RawRecord>) {
        let mut tables = self.lock();
        for mut record in records {
            match record.get(ID).and_then(Value::as_i64) {
                Some(id) => tables.next_id = tables.next_id.max(id),
                None => {
                    let id = tables.allocate_id();
                    record.insert(ID.to_string(), Value::from(id));
                }
            }
            tables.rows.entry(collection).or_default().push(record);
        }
    }

    /// Refuse every call on `collection` with `message`, as the store does for
    /// inaccessible tables.
    pub fn refuse(&self, collection: Collection, message: &str) {
        self.lock()
            .refusals
            .insert(collection, message.to_string());
    }

    /// Stored records of `collection`, unexpanded.
    pub fn records(&self, collection: Collection) -> Vec<RawRecord> {
        self.lock().rows(collection).to_vec()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn matches(&self, record: &RawRecord, query: &FetchQuery, today: NaiveDate) -> bool {
        let predicates = query.predicates.iter().all(|p| {
            self.holds(
                record.get(&p.field_name),
                p.operator,
                p.sub_operator,
                &p.values,
                today,
            )
        });
        predicates
            && query.where_groups.iter().all(|group| {
                combine(group.operator, &group.sub_groups, |sub| {
                    self.sub_group_holds(record, sub, today)
                })
            })
    }

    fn sub_group_holds(
        &self,
        record: &RawRecord,
        group: &ConditionGroup,
        today: NaiveDate,
    ) -> bool {
        combine(group.operator, &group.conditions, |c| {
            self.holds(record.get(&c.field_name), c.operator, None, &c.values, today)
        })
    }

    fn holds(
        &self,
        field: Option<&Value>,
        operator: Operator,
        sub_operator: Option<SubOperator>,
        values: &[Value],
        today: NaiveDate,
    ) -> bool {
        if values.is_empty() {
            return true;
        }
        let field = field.unwrap_or(&Value::Null);
        let tz = self.clock.tz();
        match operator {
            Operator::EqualTo => values.iter().any(|v| loose_eq(lookup_id(field), v)),
            Operator::Contains => {
                let Some(haystack) = text_of(field) else {
                    return false;
                };
                let haystack = haystack.to_lowercase();
                values
                    .iter()
                    .filter_map(text_of)
                    .any(|needle| haystack.contains(&needle.to_lowercase()))
            }
            Operator::GreaterThanOrEqualTo => matches!(
                compare(lookup_id(field), &values[0]),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::LessThanOrEqualTo => matches!(
                compare(lookup_id(field), &values[0]),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::ExactMatch => match sub_operator {
                Some(SubOperator::Day) => {
                    let day = field.as_str().and_then(|s| calendar_day(s, tz));
                    let wanted = values[0].as_str().and_then(parse_day_value);
                    day.is_some() && day == wanted
                }
                Some(SubOperator::Year) => {
                    let day = field.as_str().and_then(|s| calendar_day(s, tz));
                    let wanted = text_of(&values[0]).and_then(|y| y.trim().parse::<i32>().ok());
                    matches!((day, wanted), (Some(d), Some(y)) if d.year() == y)
                }
                None => values.iter().any(|v| loose_eq(lookup_id(field), v)),
            },
            Operator::RelativeMatch => {
                let Some(window) = values[0].as_str().and_then(RelativeWindow::parse) else {
                    log::warn!("Unsupported relative date filter: {}", values[0]);
                    return false;
                };
                field
                    .as_str()
                    .and_then(|s| calendar_day(s, tz))
                    .is_some_and(|day| window.contains(today, day))
            }
        }
    }

    fn expand_lookups(&self, tables: &Tables, collection: Collection, record: &mut RawRecord) {
        for (owner, field, target) in LOOKUPS {
            if *owner != collection {
                continue;
            }
            let Some(id) = record.get(*field).and_then(Value::as_i64) else {
                continue;
            };
            let name = tables
                .rows(*target)
                .iter()
                .find(|r| r.get(ID).and_then(Value::as_i64) == Some(id))
                .and_then(|r| r.get(NAME).cloned());
            let mut expanded = RawRecord::new();
            expanded.insert(ID.to_string(), Value::from(id));
            if let Some(name) = name {
                expanded.insert(NAME.to_string(), name);
            }
            record.insert((*field).to_string(), Value::Object(expanded));
        }
    }

    fn refusal(tables: &Tables, collection: Collection) -> Option<String> {
        tables.refusals.get(&collection).cloned()
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn fetch(
        &self,
        collection: Collection,
        query: &FetchQuery,
    ) -> Result<FetchResponse, CrmError> {
        self.pause().await;
        let today = self.today();
        let tables = self.lock();
        if let Some(message) = Self::refusal(&tables, collection) {
            return Ok(FetchResponse {
                success: false,
                message: Some(message),
                ..Default::default()
            });
        }

        let mut matched: Vec<RawRecord> = tables
            .rows(collection)
            .iter()
            .filter(|r| self.matches(r, query, today))
            .cloned()
            .collect();

        if !query.order_by.is_empty() {
            matched.sort_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|o| {
                        let ord = order_values(a.get(&o.field_name), b.get(&o.field_name));
                        match o.sorttype {
                            SortType::Asc => ord,
                            SortType::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = matched.len() as u64;
        if let Some(paging) = query.paging_info {
            matched = matched
                .into_iter()
                .skip(paging.offset as usize)
                .take(paging.limit as usize)
                .collect();
        }

        let data = matched
            .into_iter()
            .map(|mut record| {
                if !query.fields.is_empty() {
                    record.retain(|key, _| {
                        key == ID || query.fields.iter().any(|f| f.field.name == *key)
                    });
                }
                self.expand_lookups(&tables, collection, &mut record);
                record
            })
            .collect();

        Ok(FetchResponse {
            success: true,
            data,
            total: Some(total),
            message: None,
        })
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<RecordResponse, CrmError> {
        self.pause().await;
        let tables = self.lock();
        if let Some(message) = Self::refusal(&tables, collection) {
            return Ok(RecordResponse {
                success: false,
                data: None,
                message: Some(message),
            });
        }
        let found = tables
            .rows(collection)
            .iter()
            .find(|r| r.get(ID).and_then(Value::as_i64) == Some(id))
            .cloned();
        Ok(match found {
            Some(mut record) => {
                self.expand_lookups(&tables, collection, &mut record);
                RecordResponse {
                    success: true,
                    data: Some(record),
                    message: None,
                }
            }
            None => RecordResponse {
                success: false,
                data: None,
                message: Some(format!("Record with Id {} does not exist", id)),
            },
        })
    }

    async fn create(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError> {
        self.pause().await;
        let mut tables = self.lock();
        if let Some(message) = Self::refusal(&tables, collection) {
            return Ok(refused(message));
        }
        let mut results = Vec::with_capacity(records.len());
        for mut record in records {
            let id = tables.allocate_id();
            record.insert(ID.to_string(), Value::from(id));
            tables.rows.entry(collection).or_default().push(record.clone());
            self.expand_lookups(&tables, collection, &mut record);
            results.push(written(record));
        }
        Ok(MutationResponse {
            success: true,
            results,
            message: None,
        })
    }

    async fn update(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError> {
        self.pause().await;
        let mut tables = self.lock();
        if let Some(message) = Self::refusal(&tables, collection) {
            return Ok(refused(message));
        }
        let mut results = Vec::with_capacity(records.len());
        for changes in records {
            let id = changes.get(ID).and_then(Value::as_i64);
            let stored = tables.rows.get_mut(&collection).and_then(|rows| {
                rows.iter_mut()
                    .find(|r| id.is_some() && r.get(ID).and_then(Value::as_i64) == id)
            });
            match stored {
                Some(row) => {
                    row.extend(changes);
                    let mut record = row.clone();
                    self.expand_lookups(&tables, collection, &mut record);
                    results.push(written(record));
                }
                None => results.push(failed(format!(
                    "Record with Id {} does not exist",
                    id.map_or_else(|| "?".to_string(), |id| id.to_string())
                ))),
            }
        }
        Ok(MutationResponse {
            success: true,
            results,
            message: None,
        })
    }

    async fn delete(
        &self,
        collection: Collection,
        ids: &[RecordId],
    ) -> Result<MutationResponse, CrmError> {
        self.pause().await;
        let mut tables = self.lock();
        if let Some(message) = Self::refusal(&tables, collection) {
            return Ok(refused(message));
        }
        let rows = tables.rows.entry(collection).or_default();
        let results = ids
            .iter()
            .map(|id| {
                let before = rows.len();
                rows.retain(|r| r.get(ID).and_then(Value::as_i64) != Some(*id));
                if rows.len() < before {
                    RecordResult {
                        success: true,
                        ..Default::default()
                    }
                } else {
                    failed(format!("Record with Id {} does not exist", id))
                }
            })
            .collect();
        Ok(MutationResponse {
            success: true,
            results,
            message: None,
        })
    }
}

fn refused(message: String) -> MutationResponse {
    MutationResponse {
        success: false,
        results: Vec::new(),
        message: Some(message),
    }
}

fn written(record: RawRecord) -> RecordResult {
    RecordResult {
        success: true,
        data: Some(record),
        ..Default::default()
    }
}

fn failed(message: String) -> RecordResult {
    RecordResult {
        success: false,
        message: Some(message),
        ..Default::default()
    }
}

fn combine<T>(operator: GroupOperator, items: &[T], holds: impl Fn(&T) -> bool) -> bool {
    if items.is_empty() {
        return true;
    }
    match operator {
        GroupOperator::And => items.iter().all(holds),
        GroupOperator::Or => items.iter().any(holds),
    }
}

/// A lookup object compares by its id.
fn lookup_id(value: &Value) -> &Value {
    match value {
        Value::Object(obj) => obj.get(ID).unwrap_or(&Value::Null),
        other => other,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => obj.get(NAME).and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn loose_eq(field: &Value, wanted: &Value) -> bool {
    match (field, wanted) {
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(field), as_number(wanted)), (Some(a), Some(b)) if a == b)
        }
        _ => field == wanted,
    }
}

fn compare(field: &Value, bound: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_number(field), as_number(bound)) {
        return a.partial_cmp(&b);
    }
    let (a, b) = (field.as_str()?, bound.as_str()?);
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => Some(a.cmp(b)),
    }
}

/// Sort order for `orderBy`; missing values sort first.
fn order_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.map(lookup_id).filter(|v| !v.is_null());
    let b = b.map(lookup_id).filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

/// Calendar day of a stored date or timestamp. Bare dates are taken as-is.
fn calendar_day(stored: &str, tz: chrono_tz::Tz) -> Option<NaiveDate> {
    if let Ok(day) = NaiveDate::parse_from_str(stored, "%Y-%m-%d") {
        return Some(day);
    }
    parse_timestamp(stored).map(|ts| local_date(ts, tz))
}

/// Day filter values arrive as `2026-10-19` or `19 Oct 2026`.
fn parse_day_value(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value.trim(), "%d %b %Y"))
        .ok()
}
