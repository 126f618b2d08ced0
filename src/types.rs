use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::RecordId;

// =============================================================================
// Defaults applied when a stored field is missing
// =============================================================================

pub const DEFAULT_TEAM_SIZE: &str = "1-3";
pub const DEFAULT_LEAD_STATUS: &str = "Keep an Eye";
pub const DEFAULT_FUNDING_TYPE: &str = "Bootstrapped";
pub const DEFAULT_EDITION: &str = "Select Edition";
pub const DEFAULT_DEAL_STAGE: &str = "Connected";
pub const DEFAULT_START_MONTH: u32 = 1;
pub const DEFAULT_END_MONTH: u32 = 3;
pub const DEFAULT_CONTACT_STATUS: &str = "New";
pub const DEFAULT_MEMBER_ROLE: &str = "viewer";
pub const MEMBER_STATUS_PENDING: &str = "pending";
pub const MEMBER_STATUS_ACTIVE: &str = "active";
pub const MEMBER_STATUS_INACTIVE: &str = "inactive";

/// Display name for a lead whose adding rep is unknown.
pub const UNKNOWN_REP: &str = "Unknown";
/// Display name for a deal or contact with no assigned rep.
pub const UNASSIGNED_REP: &str = "Unassigned";

// =============================================================================
// Records
// =============================================================================

/// Reference to another record (a lookup field), optionally carrying its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRef {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RecordRef {
    pub fn new(id: RecordId, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: RecordId,
    pub name: String,
    pub product_name: String,
    pub website_url: String,
    pub team_size: String,
    pub arr: f64,
    pub category: String,
    pub linkedin_url: String,
    pub status: String,
    pub funding_type: String,
    pub edition: String,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub added_by: Option<RecordRef>,
}

impl Lead {
    pub fn added_by_id(&self) -> Option<RecordId> {
        self.added_by.as_ref().map(|r| r.id)
    }

    pub fn added_by_name(&self) -> &str {
        self.added_by
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .unwrap_or(UNKNOWN_REP)
    }
}

/// Partial lead update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub product_name: Option<String>,
    pub website_url: Option<String>,
    pub team_size: Option<String>,
    pub arr: Option<f64>,
    pub category: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: Option<String>,
    pub funding_type: Option<String>,
    pub edition: Option<String>,
    pub follow_up_date: Option<Option<NaiveDate>>,
    pub added_by: Option<Option<RecordId>>,
}

/// Intake form payload for a new lead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewLead {
    pub name: Option<String>,
    pub product_name: String,
    pub website_url: String,
    pub team_size: Option<String>,
    pub arr: Option<f64>,
    pub category: String,
    pub linkedin_url: String,
    pub status: Option<String>,
    pub funding_type: Option<String>,
    pub edition: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub added_by: Option<RecordId>,
}

impl NewLead {
    /// Full field set with defaults filled in. The record name falls back to the
    /// product name.
    pub fn into_patch(self) -> LeadPatch {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.product_name.clone());
        LeadPatch {
            name: Some(name),
            product_name: Some(self.product_name),
            website_url: Some(self.website_url),
            team_size: Some(self.team_size.unwrap_or_else(|| DEFAULT_TEAM_SIZE.to_string())),
            arr: Some(self.arr.unwrap_or(0.0)),
            category: Some(self.category),
            linkedin_url: Some(self.linkedin_url),
            status: Some(self.status.unwrap_or_else(|| DEFAULT_LEAD_STATUS.to_string())),
            funding_type: Some(
                self.funding_type
                    .unwrap_or_else(|| DEFAULT_FUNDING_TYPE.to_string()),
            ),
            edition: Some(self.edition.unwrap_or_else(|| DEFAULT_EDITION.to_string())),
            follow_up_date: Some(self.follow_up_date),
            added_by: Some(self.added_by),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRep {
    pub id: RecordId,
    pub name: String,
    pub leads_contacted: u32,
    pub meetings_booked: u32,
    pub deals_closed: u32,
    pub total_revenue: f64,
    /// Derived: deals closed per lead contacted, as a percentage.
    pub conversion_rate: f64,
}

impl SalesRep {
    pub fn new(
        id: RecordId,
        name: &str,
        leads_contacted: u32,
        meetings_booked: u32,
        deals_closed: u32,
        total_revenue: f64,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            leads_contacted,
            meetings_booked,
            deals_closed,
            total_revenue,
            conversion_rate: conversion_rate(deals_closed, leads_contacted),
        }
    }
}

/// `deals / leads × 100`, or 0 when no leads were contacted.
pub fn conversion_rate(deals_closed: u32, leads_contacted: u32) -> f64 {
    if leads_contacted == 0 {
        0.0
    } else {
        f64::from(deals_closed) / f64::from(leads_contacted) * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesRepPatch {
    pub name: Option<String>,
    pub leads_contacted: Option<u32>,
    pub meetings_booked: Option<u32>,
    pub deals_closed: Option<u32>,
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSalesRep {
    pub name: String,
    pub leads_contacted: u32,
    pub meetings_booked: u32,
    pub deals_closed: u32,
    pub total_revenue: f64,
}

impl NewSalesRep {
    pub fn into_patch(self) -> SalesRepPatch {
        SalesRepPatch {
            name: Some(self.name),
            leads_contacted: Some(self.leads_contacted),
            meetings_booked: Some(self.meetings_booked),
            deals_closed: Some(self.deals_closed),
            total_revenue: Some(self.total_revenue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: RecordId,
    pub name: String,
    pub lead_name: String,
    pub lead_id: String,
    pub value: f64,
    pub stage: String,
    pub edition: String,
    pub start_month: u32,
    pub end_month: u32,
    pub created_at: DateTime<Utc>,
    pub assigned_rep: Option<RecordRef>,
}

impl Deal {
    pub fn assigned_rep_name(&self) -> &str {
        self.assigned_rep
            .as_ref()
            .and_then(|r| r.name.as_deref())
            .unwrap_or(UNASSIGNED_REP)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealPatch {
    pub name: Option<String>,
    pub lead_name: Option<String>,
    pub lead_id: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    pub edition: Option<String>,
    pub start_month: Option<u32>,
    pub end_month: Option<u32>,
    pub assigned_rep: Option<Option<RecordId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDeal {
    pub name: String,
    pub lead_name: String,
    pub lead_id: String,
    pub value: f64,
    pub stage: Option<String>,
    pub edition: Option<String>,
    pub start_month: Option<u32>,
    pub end_month: Option<u32>,
    pub assigned_rep: Option<RecordId>,
}

impl NewDeal {
    pub fn into_patch(self) -> DealPatch {
        DealPatch {
            name: Some(self.name),
            lead_name: Some(self.lead_name),
            lead_id: Some(self.lead_id),
            value: Some(self.value),
            stage: Some(self.stage.unwrap_or_else(|| DEFAULT_DEAL_STAGE.to_string())),
            edition: Some(self.edition.unwrap_or_else(|| DEFAULT_EDITION.to_string())),
            start_month: Some(self.start_month.unwrap_or(DEFAULT_START_MONTH)),
            end_month: Some(self.end_month.unwrap_or(DEFAULT_END_MONTH)),
            assigned_rep: Some(self.assigned_rep),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub company: String,
    pub status: String,
    pub assigned_rep: Option<RecordRef>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
    pub assigned_rep: Option<Option<RecordId>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub company: String,
    pub status: Option<String>,
    pub assigned_rep: Option<RecordId>,
    pub notes: String,
}

impl NewContact {
    pub fn into_patch(self) -> ContactPatch {
        ContactPatch {
            name: Some(self.name),
            email: Some(self.email),
            company: Some(self.company),
            status: Some(self.status.unwrap_or_else(|| DEFAULT_CONTACT_STATUS.to_string())),
            assigned_rep: Some(self.assigned_rep),
            notes: Some(self.notes),
        }
    }
}

/// Page-level access flags for a team member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub dashboard: bool,
    pub leads: bool,
    pub hotlist: bool,
    pub pipeline: bool,
    pub calendar: bool,
    pub analytics: bool,
    pub leaderboard: bool,
    pub contacts: bool,
}

impl Permissions {
    /// Access granted to freshly invited members.
    pub fn dashboard_only() -> Self {
        Self {
            dashboard: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: Permissions,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Permissions>,
    pub status: Option<String>,
    pub last_login: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
    pub role: Option<String>,
    pub permissions: Option<Permissions>,
}

// =============================================================================
// Configuration
// =============================================================================

/// Application configuration stored in ~/.leadpulse/config.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// IANA timezone every calendar-day computation is pinned to.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub reports: ReportConfig,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            timezone: default_timezone(),
            reports: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_id: String::new(),
            public_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_follow_up_horizon_days")]
    pub follow_up_horizon_days: u32,
    #[serde(default = "default_chart_window_days")]
    pub chart_window_days: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_follow_up_horizon_days() -> u32 {
    7
}

fn default_chart_window_days() -> u32 {
    30
}

fn default_page_size() -> u32 {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            follow_up_horizon_days: default_follow_up_horizon_days(),
            chart_window_days: default_chart_window_days(),
            page_size: default_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rate_zero_leads() {
        assert_eq!(conversion_rate(4, 0), 0.0);
        assert_eq!(conversion_rate(3, 10), 30.0);
    }

    #[test]
    fn test_new_lead_name_falls_back_to_product() {
        let patch = NewLead {
            product_name: "Ledgerly".to_string(),
            website_url: "https://ledgerly.io".to_string(),
            ..Default::default()
        }
        .into_patch();
        assert_eq!(patch.name.as_deref(), Some("Ledgerly"));
        assert_eq!(patch.team_size.as_deref(), Some(DEFAULT_TEAM_SIZE));
        assert_eq!(patch.status.as_deref(), Some(DEFAULT_LEAD_STATUS));
        assert_eq!(patch.follow_up_date, Some(None));
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.gateway.request_timeout_secs, 15);
        assert_eq!(config.reports.follow_up_horizon_days, 7);
        assert_eq!(config.reports.chart_window_days, 30);
        assert_eq!(config.reports.page_size, 20);
    }

    #[test]
    fn test_lead_added_by_name_fallback() {
        let lead = crate::test_utils::lead(1, "https://a.io", "2026-10-19T09:00:00.000Z", None);
        assert_eq!(lead.added_by_name(), UNKNOWN_REP);
    }
}
