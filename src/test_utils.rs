//! Shared fixtures for unit tests.
//!
//! The pinned clock reads 2026-10-19 12:00 UTC (a Monday). The seeded pipeline is laid out
//! around that day so every report has something to count.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::analytics::calendar::ReportClock;
use crate::gateway::memory::InMemoryGateway;
use crate::gateway::{RawRecord, RecordId};
use crate::mapper::parse_timestamp;
use crate::types::{
    Lead, RecordRef, SalesRep, DEFAULT_EDITION, DEFAULT_FUNDING_TYPE, DEFAULT_LEAD_STATUS,
    DEFAULT_TEAM_SIZE,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn clock() -> ReportClock {
    ReportClock::pinned(chrono_tz::UTC, now())
}

pub fn raw(value: Value) -> RawRecord {
    value.as_object().cloned().expect("fixture must be a JSON object")
}

pub fn lead(
    id: RecordId,
    website_url: &str,
    created_at: &str,
    added_by: Option<(RecordId, &str)>,
) -> Lead {
    Lead {
        id,
        name: format!("Lead {}", id),
        product_name: String::new(),
        website_url: website_url.to_string(),
        team_size: DEFAULT_TEAM_SIZE.to_string(),
        arr: 0.0,
        category: String::new(),
        linkedin_url: String::new(),
        status: DEFAULT_LEAD_STATUS.to_string(),
        funding_type: DEFAULT_FUNDING_TYPE.to_string(),
        edition: DEFAULT_EDITION.to_string(),
        follow_up_date: None,
        created_at: parse_timestamp(created_at).expect("fixture timestamp"),
        added_by: added_by.map(|(id, name)| RecordRef::new(id, name)),
    }
}

pub fn rep(
    id: RecordId,
    name: &str,
    leads_contacted: u32,
    meetings_booked: u32,
    deals_closed: u32,
    total_revenue: f64,
) -> SalesRep {
    SalesRep::new(
        id,
        name,
        leads_contacted,
        meetings_booked,
        deals_closed,
        total_revenue,
    )
}

/// Store contents used by service tests, keyed by table name.
pub fn pipeline_fixture() -> Value {
    json!({
        "sales_rep_c": [
            { "Id": 1, "Name": "Maya", "leads_contacted_c": 10, "meetings_booked_c": 4,
              "deals_closed_c": 3, "total_revenue_c": 48000 },
            { "Id": 2, "Name": "Omar", "leads_contacted_c": 2, "meetings_booked_c": 1,
              "deals_closed_c": 1, "total_revenue_c": 12000 },
            { "Id": 3, "Name": "Ines", "leads_contacted_c": 0, "meetings_booked_c": 0,
              "deals_closed_c": 0, "total_revenue_c": 0 }
        ],
        "lead_c": [
            { "Id": 101, "Name": "Ledgerly", "product_name_c": "Ledgerly",
              "website_url_c": "https://ledgerly.io/", "category_c": "Fintech",
              "status_c": "Connected", "arr_c": 1200000, "funding_type_c": "Seed",
              "team_size_c": "11-50", "follow_up_date_c": "2026-10-21",
              "created_at_c": "2026-10-19T09:00:00.000Z", "added_by_c": 1 },
            { "Id": 102, "Name": "Shipwell", "product_name_c": "Shipwell",
              "website_url_c": "https://shipwell.dev", "category_c": "Logistics",
              "status_c": "Keep an Eye", "arr_c": 300000,
              "follow_up_date_c": "2026-10-19",
              "created_at_c": "2026-10-19T10:30:00.000Z", "added_by_c": 1 },
            { "Id": 103, "Name": "Fintrack", "product_name_c": "Fintrack",
              "website_url_c": "https://fintrack.com", "category_c": "Fintech",
              "status_c": "Closed", "arr_c": 50000, "follow_up_date_c": "2026-10-30",
              "created_at_c": "2026-10-18T15:00:00.000Z", "added_by_c": 2 },
            { "Id": 104, "Name": "Nimbus", "product_name_c": "Nimbus",
              "website_url_c": "https://nimbus.ai", "category_c": "AI",
              "status_c": "Keep an Eye", "arr_c": 0, "follow_up_date_c": "2026-10-18",
              "created_at_c": "2026-10-12T08:00:00.000Z", "added_by_c": 2 },
            { "Id": 105, "Name": "Orbit", "product_name_c": "Orbit",
              "website_url_c": "https://orbit.so", "category_c": "AI",
              "status_c": "Connected", "arr_c": 750000, "follow_up_date_c": "2026-10-26",
              "created_at_c": "2026-09-25T08:00:00.000Z", "added_by_c": 1 },
            { "Id": 106, "Name": "Legacy", "product_name_c": "Legacy",
              "website_url_c": "https://legacy.net", "category_c": "SaaS",
              "status_c": "Closed", "arr_c": 20000,
              "created_at_c": "2026-08-01T08:00:00.000Z" },
            { "Id": 107, "Name": "Quill", "product_name_c": "Quill",
              "website_url_c": "https://quill.app", "category_c": "Fintech",
              "status_c": "Connected", "arr_c": 0,
              "created_at_c": "2026-10-19T11:00:00.000Z", "added_by_c": 4 }
        ],
        "deal_c": [
            { "Id": 201, "Name": "Ledgerly annual", "lead_name_c": "Ledgerly",
              "lead_id_c": "101", "value_c": 24000, "stage_c": "Meeting Booked",
              "created_at_c": "2026-10-02T09:00:00.000Z", "assigned_rep_c": 1 },
            { "Id": 202, "Name": "Fintrack pilot", "lead_name_c": "Fintrack",
              "lead_id_c": "103", "value_c": 6000, "stage_c": "Closed",
              "created_at_c": "2025-11-20T09:00:00.000Z", "assigned_rep_c": 2 }
        ],
        "contact_c": [
            { "Id": 301, "Name": "Dana Ruiz", "email_c": "dana@ledgerly.io",
              "company_c": "Ledgerly", "status_c": "Qualified", "assigned_rep_c": 1,
              "created_at_c": "2026-10-03T09:00:00.000Z" }
        ],
        "team_member_c": [
            { "Id": 401, "Name": "Ines", "email_c": "ines@leadpulse.app", "role_c": "admin",
              "permissions_c": "{\"dashboard\":true,\"leads\":true,\"analytics\":true}",
              "status_c": "active", "created_at_c": "2026-09-01T10:00:00.000Z",
              "updated_at_c": "2026-09-01T10:00:00.000Z" }
        ]
    })
}

/// In-memory gateway seeded with [`pipeline_fixture`] under the pinned clock.
pub fn seeded_gateway() -> InMemoryGateway {
    InMemoryGateway::from_fixture(&pipeline_fixture(), clock()).expect("pipeline fixture")
}
