//! Record gateway: the external CRUD/query service that owns every persisted record.
//!
//! The core never manages connections or auth. Services receive a `&dyn RecordGateway`
//! per call and interpret the success flags and per-record results here.

pub mod http;
pub mod memory;
pub mod query;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CrmError;

pub use query::{
    Condition, ConditionGroup, FetchQuery, GroupOperator, Operator, OrderBy, Paging, Predicate,
    SortType, SubOperator, WhereGroup,
};

/// Primary key of a stored record.
pub type RecordId = i64;

/// A record exactly as the gateway returns it, keyed by storage field name.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Named record collections held by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "lead_c")]
    Lead,
    #[serde(rename = "deal_c")]
    Deal,
    #[serde(rename = "sales_rep_c")]
    SalesRep,
    #[serde(rename = "contact_c")]
    Contact,
    #[serde(rename = "team_member_c")]
    TeamMember,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Lead,
        Collection::Deal,
        Collection::SalesRep,
        Collection::Contact,
        Collection::TeamMember,
    ];

    /// Storage table name.
    pub fn table(self) -> &'static str {
        match self {
            Collection::Lead => "lead_c",
            Collection::Deal => "deal_c",
            Collection::SalesRep => "sales_rep_c",
            Collection::Contact => "contact_c",
            Collection::TeamMember => "team_member_c",
        }
    }

    /// Lower-case noun used in failure messages ("Failed to create sales rep").
    pub fn noun(self) -> &'static str {
        match self {
            Collection::Lead => "lead",
            Collection::Deal => "deal",
            Collection::SalesRep => "sales rep",
            Collection::Contact => "contact",
            Collection::TeamMember => "team member",
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.table() == table)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Collection::Lead => "Lead",
            Collection::Deal => "Deal",
            Collection::SalesRep => "Sales rep",
            Collection::Contact => "Contact",
            Collection::TeamMember => "Team member",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of a filtered fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a get-by-id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of create/update/delete: an overall flag plus one entry per submitted record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<RecordResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RawRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub errors: Vec<FieldError>,
}

/// Field-level validation failure reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    #[serde(default)]
    pub field_label: String,
    #[serde(default)]
    pub message: String,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// The five CRUD operations of the external record store.
///
/// `Err` means the call itself failed (transport, decoding). A call that reached the store
/// but was refused comes back as `Ok` with `success: false`.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn fetch(
        &self,
        collection: Collection,
        query: &FetchQuery,
    ) -> Result<FetchResponse, CrmError>;

    async fn get_by_id(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<RecordResponse, CrmError>;

    async fn create(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError>;

    async fn update(
        &self,
        collection: Collection,
        records: Vec<RawRecord>,
    ) -> Result<MutationResponse, CrmError>;

    async fn delete(
        &self,
        collection: Collection,
        ids: &[RecordId],
    ) -> Result<MutationResponse, CrmError>;
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

/// Unwrap a fetch, turning `success: false` into a gateway failure.
pub fn expect_fetched(
    collection: Collection,
    response: FetchResponse,
) -> Result<(Vec<RawRecord>, Option<u64>), CrmError> {
    if !response.success {
        return Err(CrmError::Gateway(response.message.unwrap_or_else(|| {
            format!("Failed to fetch {} records", collection.noun())
        })));
    }
    Ok((response.data, response.total))
}

/// Unwrap a get-by-id. Any refusal or empty payload is reported as not found.
pub fn expect_found(
    collection: Collection,
    id: RecordId,
    response: RecordResponse,
) -> Result<RawRecord, CrmError> {
    match response.data {
        Some(data) if response.success => Ok(data),
        _ => {
            if let Some(message) = response.message {
                log::debug!("{} {} lookup refused: {}", collection, id, message);
            }
            Err(CrmError::NotFound { collection, id })
        }
    }
}

/// Unwrap a create/update and return the first written record.
///
/// The first failing record's message takes precedence when several fail.
pub fn expect_written(
    collection: Collection,
    verb: &str,
    response: MutationResponse,
) -> Result<RawRecord, CrmError> {
    let mut results = check_results(collection, verb, response)?;
    if results.is_empty() {
        return Err(CrmError::Gateway(format!("No records {}d", verb)));
    }
    match results.remove(0).data {
        Some(data) => Ok(data),
        None => Err(CrmError::Gateway(format!("No records {}d", verb))),
    }
}

/// Unwrap a delete.
pub fn expect_deleted(collection: Collection, response: MutationResponse) -> Result<(), CrmError> {
    check_results(collection, "delete", response).map(|_| ())
}

fn check_results(
    collection: Collection,
    verb: &str,
    response: MutationResponse,
) -> Result<Vec<RecordResult>, CrmError> {
    if !response.success {
        return Err(CrmError::Gateway(response.message.unwrap_or_else(|| {
            format!("Failed to {} {}", verb, collection.noun())
        })));
    }

    let (succeeded, failed): (Vec<_>, Vec<_>) =
        response.results.into_iter().partition(|r| r.success);

    if let Some(first) = failed.first() {
        for result in &failed {
            for field_error in &result.errors {
                log::error!("{}: {}", field_error.field_label, field_error.message);
            }
        }
        return Err(CrmError::Gateway(first.message.clone().unwrap_or_else(|| {
            format!("Failed to {} {}", verb, collection.noun())
        })));
    }

    Ok(succeeded)
}

/// Bound a gateway call by `limit`; elapsed calls become [`CrmError::Timeout`].
pub async fn within<T, F>(limit: Duration, call: F) -> Result<T, CrmError>
where
    F: Future<Output = Result<T, CrmError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CrmError::Timeout(limit.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fetch_response_tolerates_null_data() {
        let parsed: FetchResponse =
            serde_json::from_value(json!({ "success": true, "data": null })).unwrap();
        assert!(parsed.success);
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_expect_fetched_surfaces_message() {
        let response = FetchResponse {
            success: false,
            message: Some("Table lead_c is not accessible".to_string()),
            ..Default::default()
        };
        let err = expect_fetched(Collection::Lead, response).unwrap_err();
        assert_eq!(err.to_string(), "Table lead_c is not accessible");
    }

    #[test]
    fn test_expect_written_prefers_first_failure_message() {
        let response = MutationResponse {
            success: true,
            results: vec![
                RecordResult {
                    success: true,
                    data: Some(raw(json!({ "Id": 1 }))),
                    ..Default::default()
                },
                RecordResult {
                    success: false,
                    message: Some("website_url_c is required".to_string()),
                    ..Default::default()
                },
                RecordResult {
                    success: false,
                    message: Some("second failure".to_string()),
                    ..Default::default()
                },
            ],
            message: None,
        };
        let err = expect_written(Collection::Lead, "create", response).unwrap_err();
        assert_eq!(err.to_string(), "website_url_c is required");
    }

    #[test]
    fn test_expect_written_default_failure_message() {
        let response = MutationResponse {
            success: true,
            results: vec![RecordResult::default()],
            message: None,
        };
        let err = expect_written(Collection::SalesRep, "update", response).unwrap_err();
        assert_eq!(err.to_string(), "Failed to update sales rep");
    }

    #[test]
    fn test_expect_written_without_results() {
        let response = MutationResponse {
            success: true,
            results: vec![],
            message: None,
        };
        let err = expect_written(Collection::Deal, "create", response).unwrap_err();
        assert_eq!(err.to_string(), "No records created");
    }

    #[test]
    fn test_expect_found_maps_refusal_to_not_found() {
        let response = RecordResponse {
            success: false,
            data: None,
            message: Some("Record does not exist".to_string()),
        };
        let err = expect_found(Collection::Contact, 9, response).unwrap_err();
        assert!(matches!(
            err,
            CrmError::NotFound {
                collection: Collection::Contact,
                id: 9
            }
        ));
    }

    #[test]
    fn test_collection_table_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_table(collection.table()), Some(collection));
        }
        assert_eq!(Collection::from_table("unknown_c"), None);
    }

    #[tokio::test]
    async fn test_within_times_out_pending_call() {
        let result: Result<(), CrmError> = within(
            Duration::from_millis(10),
            std::future::pending::<Result<(), CrmError>>(),
        )
        .await;
        assert!(matches!(result, Err(CrmError::Timeout(10))));
    }
}
