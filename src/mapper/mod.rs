//! Field mapping between gateway storage names (`website_url_c`) and typed records.
//!
//! `normalize` is total: absent, `null` or wrongly-typed fields take the record's default
//! and are remembered as defaulted. `denormalize` writes back only the fields the raw
//! record actually carried plus explicitly patched ones, so defaults never leak upstream.

pub mod contacts;
pub mod deals;
pub mod leads;
pub mod reps;
pub mod team;

use std::collections::BTreeSet;
use std::ops::Deref;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::gateway::{Collection, RawRecord, RecordId};
use crate::types::RecordRef;

pub const ID: &str = "Id";
pub const NAME: &str = "Name";

/// A typed record mapped to and from gateway storage fields.
pub trait FieldMap: Sized {
    const COLLECTION: Collection;
    /// Storage fields requested on fetch.
    const FIELDS: &'static [&'static str];
    type Patch: Default;

    fn read(fields: &mut FieldReader<'_>) -> Self;
    /// Write only the fields set in `patch`, in the form the gateway accepts on writes.
    fn write_patch(patch: &Self::Patch, out: &mut FieldWriter);
}

/// A normalized record plus the storage fields that were filled from defaults.
///
/// The mapped fields that were present are kept exactly as stored, so writing the record
/// back never rewrites a value the gateway sent in another accepted form.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    pub record: T,
    pub defaulted: BTreeSet<&'static str>,
    stored: RawRecord,
}

impl<T> Mapped<T> {
    pub fn into_inner(self) -> T {
        self.record
    }

    pub fn was_defaulted(&self, field: &str) -> bool {
        self.defaulted.contains(field)
    }
}

impl<T> Deref for Mapped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

pub fn normalize<T: FieldMap>(raw: &RawRecord) -> Mapped<T> {
    let mut reader = FieldReader::new(raw);
    let record = T::read(&mut reader);
    let defaulted = reader.defaulted;
    let stored = raw
        .iter()
        .filter(|(key, _)| key.as_str() == ID || T::FIELDS.contains(&key.as_str()))
        .filter(|(key, _)| !defaulted.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Mapped {
        record,
        defaulted,
        stored,
    }
}

pub fn normalize_all<T: FieldMap>(raws: &[RawRecord]) -> Vec<T> {
    raws.iter().map(|raw| normalize::<T>(raw).record).collect()
}

/// Mapped fields present in `record`'s raw source, as stored, overlaid with `updates`.
pub fn denormalize<T: FieldMap>(record: &Mapped<T>, updates: &T::Patch) -> RawRecord {
    let mut out = record.stored.clone();
    let mut patched = FieldWriter::default();
    T::write_patch(updates, &mut patched);
    out.extend(patched.finish());
    out
}

/// Partial update body: the record id plus explicitly provided fields.
pub fn patch_record<T: FieldMap>(id: RecordId, patch: &T::Patch) -> RawRecord {
    let mut out = FieldWriter::default();
    out.put_id(id);
    T::write_patch(patch, &mut out);
    out.finish()
}

/// Create body: every field of `patch`, without an id.
pub fn draft_record<T: FieldMap>(patch: &T::Patch) -> RawRecord {
    let mut out = FieldWriter::default();
    T::write_patch(patch, &mut out);
    out.finish()
}

/// Decode a value stored either as a JSON document or as a JSON-encoded string.
///
/// Anything that does not decode yields `T::default()`.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: Option<&Value>) -> T {
    decode(value).unwrap_or_default()
}

fn decode<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    let parsed = match value? {
        Value::Null => return None,
        Value::String(text) => serde_json::from_str(text),
        other => serde_json::from_value(other.clone()),
    };
    match parsed {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::debug!("Stored JSON did not decode, using default: {}", e);
            None
        }
    }
}

/// Parse a stored timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date (UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Stored form of a timestamp (`2026-10-19T08:30:00.000Z`).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(text).map(|ts| ts.date_naive()))
}

/// JSON number for `value`, integral when possible so stored integers survive a round trip.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Reads typed values out of a raw record, tracking which fields fell back to defaults.
pub struct FieldReader<'a> {
    raw: &'a RawRecord,
    defaulted: BTreeSet<&'static str>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a RawRecord) -> Self {
        Self {
            raw,
            defaulted: BTreeSet::new(),
        }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.raw.get(key).filter(|v| !v.is_null())
    }

    fn or_default<T>(&mut self, key: &'static str, value: Option<T>, default: T) -> T {
        match value {
            Some(v) => v,
            None => {
                self.defaulted.insert(key);
                default
            }
        }
    }

    pub fn id(&mut self) -> RecordId {
        let value = self.present(ID).and_then(Value::as_i64);
        self.or_default(ID, value, 0)
    }

    pub fn text(&mut self, key: &'static str, default: &str) -> String {
        let value = self
            .present(key)
            .and_then(Value::as_str)
            .map(str::to_string);
        self.or_default(key, value, default.to_string())
    }

    pub fn number(&mut self, key: &'static str, default: f64) -> f64 {
        let value = self.present(key).and_then(Value::as_f64);
        self.or_default(key, value, default)
    }

    /// Like [`number`](Self::number), but negative values count as absent.
    pub fn non_negative(&mut self, key: &'static str, default: f64) -> f64 {
        let value = self
            .present(key)
            .and_then(Value::as_f64)
            .filter(|n| *n >= 0.0);
        self.or_default(key, value, default)
    }

    pub fn count(&mut self, key: &'static str, default: u32) -> u32 {
        let value = self
            .present(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());
        self.or_default(key, value, default)
    }

    /// Missing timestamps read as the Unix epoch so they fall outside every report window.
    pub fn timestamp(&mut self, key: &'static str) -> DateTime<Utc> {
        let value = self.opt_timestamp(key);
        self.or_default(key, value, DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn opt_timestamp(&mut self, key: &'static str) -> Option<DateTime<Utc>> {
        let value = self
            .present(key)
            .and_then(Value::as_str)
            .and_then(parse_timestamp);
        if value.is_none() {
            self.defaulted.insert(key);
        }
        value
    }

    pub fn opt_date(&mut self, key: &'static str) -> Option<NaiveDate> {
        let value = self.present(key).and_then(Value::as_str).and_then(parse_date);
        if value.is_none() {
            self.defaulted.insert(key);
        }
        value
    }

    /// Lookup fields arrive as `{ "Id": .., "Name": .. }` or as a bare id.
    pub fn lookup(&mut self, key: &'static str) -> Option<RecordRef> {
        let value = match self.present(key) {
            Some(Value::Object(obj)) => obj.get(ID).and_then(Value::as_i64).map(|id| RecordRef {
                id,
                name: obj.get(NAME).and_then(Value::as_str).map(str::to_string),
            }),
            Some(Value::Number(n)) => n.as_i64().map(|id| RecordRef { id, name: None }),
            _ => None,
        };
        if value.is_none() {
            self.defaulted.insert(key);
        }
        value
    }

    pub fn decoded<T: DeserializeOwned + Default>(&mut self, key: &'static str) -> T {
        let value = decode(self.present(key));
        self.or_default(key, value, T::default())
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Builds the raw field set sent on create and update calls.
#[derive(Debug, Default)]
pub struct FieldWriter {
    fields: RawRecord,
}

impl FieldWriter {
    pub fn finish(self) -> RawRecord {
        self.fields
    }

    fn put(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn put_id(&mut self, id: RecordId) {
        self.put(ID, Value::from(id));
    }

    pub fn put_text(&mut self, key: &str, value: &str) {
        self.put(key, Value::from(value));
    }

    pub fn put_number(&mut self, key: &str, value: f64) {
        self.put(key, number_value(value));
    }

    pub fn put_count(&mut self, key: &str, value: u32) {
        self.put(key, Value::from(value));
    }

    pub fn put_opt_timestamp(&mut self, key: &str, value: Option<DateTime<Utc>>) {
        self.put(key, value.map(format_timestamp).map_or(Value::Null, Value::from));
    }

    pub fn put_opt_date(&mut self, key: &str, value: Option<NaiveDate>) {
        self.put(
            key,
            value
                .map(|d| d.format("%Y-%m-%d").to_string())
                .map_or(Value::Null, Value::from),
        );
    }

    /// Lookup as a bare id.
    pub fn put_lookup_id(&mut self, key: &str, value: Option<RecordId>) {
        self.put(key, value.map_or(Value::Null, Value::from));
    }

    /// Store `value` as a JSON-encoded string.
    pub fn put_encoded<T: Serialize>(&mut self, key: &str, value: &T) {
        let encoded = serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string());
        self.put(key, Value::from(encoded));
    }
}
