use serde::Deserialize;

use super::{
    create_raw, degrade, delete_record, fetch_all, get_record, update_raw, Page, ReportContext,
};
use crate::error::CrmError;
use crate::gateway::{FetchQuery, Predicate, RecordGateway, RecordId, SortType};
use crate::mapper::leads::{
    ADDED_BY, CATEGORY, CREATED_AT, FUNDING_TYPE, PRODUCT_NAME, STATUS, TEAM_SIZE, WEBSITE_URL,
};
use crate::mapper::{draft_record, patch_record, FieldMap, NAME};
use crate::types::{Lead, LeadPatch, NewLead};

const SEARCH_FIELDS: [&str; 4] = [PRODUCT_NAME, NAME, WEBSITE_URL, CATEGORY];

/// Lead list options. Blank strings and "all" mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub funding_type: Option<String>,
    pub category: Option<String>,
    pub team_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Storage field for a sort key, `None` for unknown keys.
fn sort_field(sort_by: &str) -> Option<&'static str> {
    match sort_by {
        "productName" => Some(PRODUCT_NAME),
        "name" => Some(NAME),
        "websiteUrl" => Some(WEBSITE_URL),
        "createdAt" => Some(CREATED_AT),
        _ => None,
    }
}

impl LeadListParams {
    pub fn to_query(&self, default_limit: u32) -> FetchQuery {
        let mut query = FetchQuery::select(Lead::FIELDS);
        if let Some(term) = active(&self.search) {
            query = query.search_any(&SEARCH_FIELDS, term);
        }
        for (field, value) in [
            (STATUS, &self.status),
            (FUNDING_TYPE, &self.funding_type),
            (CATEGORY, &self.category),
            (TEAM_SIZE, &self.team_size),
        ] {
            if let Some(value) = active(value) {
                query = query.filter(Predicate::equal_to(field, value));
            }
        }

        let (field, order) = match self.sort_by.as_deref().and_then(sort_field) {
            Some(field) => (
                field,
                self.sort_order
                    .as_deref()
                    .map(SortType::parse)
                    .unwrap_or_default(),
            ),
            None => (CREATED_AT, SortType::Desc),
        };
        query
            .order(field, order)
            .page(self.page(), self.limit.unwrap_or(default_limit))
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// A page of leads. Failures degrade to an empty page.
pub async fn list_leads(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    params: &LeadListParams,
) -> Page<Lead> {
    let limit = params.limit.unwrap_or(ctx.reports.page_size);
    let query = params.to_query(ctx.reports.page_size);
    let result = fetch_all::<Lead>(gateway, ctx, &query)
        .await
        .map(|(items, total)| Page {
            total: total.unwrap_or(items.len() as u64),
            items,
            page: params.page(),
            limit,
        });
    degrade("leads", result, Page::empty(params.page(), limit))
}

pub async fn get_lead(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<Lead, CrmError> {
    get_record::<Lead>(gateway, ctx, id).await.map(|m| m.into_inner())
}

fn validate_website(url: &str) -> Result<(), CrmError> {
    if url.trim().is_empty() {
        return Err(CrmError::Validation("Website URL is required".to_string()));
    }
    Ok(())
}

/// Create a lead, stamped with the current time. Missing optional fields get defaults.
pub async fn create_lead(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    lead: NewLead,
) -> Result<Lead, CrmError> {
    validate_website(&lead.website_url)?;
    let mut patch = lead.into_patch();
    patch.website_url = patch.website_url.map(|url| url.trim().to_string());

    let mut body = draft_record::<Lead>(&patch);
    body.insert(CREATED_AT.to_string(), ctx.stamp());
    create_raw::<Lead>(gateway, ctx, body).await
}

pub async fn update_lead(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
    patch: &LeadPatch,
) -> Result<Lead, CrmError> {
    if let Some(url) = &patch.website_url {
        validate_website(url)?;
    }
    update_raw::<Lead>(gateway, ctx, patch_record::<Lead>(id, patch)).await
}

pub async fn delete_lead(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    delete_record::<Lead>(gateway, ctx, id).await
}

/// Leads added by `rep_id`, or all leads.
pub(crate) fn by_rep(query: FetchQuery, rep_id: Option<RecordId>) -> FetchQuery {
    match rep_id {
        Some(id) => query.filter(Predicate::equal_to(ADDED_BY, id)),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Collection;
    use crate::services::test_context;
    use crate::test_utils::seeded_gateway;

    fn ids(page: &Page<Lead>) -> Vec<RecordId> {
        page.items.iter().map(|l| l.id).collect()
    }

    #[tokio::test]
    async fn test_default_list_is_newest_first() {
        let gateway = seeded_gateway();
        let page = list_leads(&gateway, &test_context(), &LeadListParams::default()).await;
        assert_eq!(ids(&page), vec![107, 102, 101, 103, 104, 105, 106]);
        assert_eq!(page.total, 7);
        assert_eq!((page.page, page.limit), (1, 20));
    }

    #[tokio::test]
    async fn test_search_and_filters_combine() {
        let gateway = seeded_gateway();
        let params = LeadListParams {
            search: Some("fin".to_string()),
            status: Some("Connected".to_string()),
            category: Some("all".to_string()),
            ..Default::default()
        };
        let page = list_leads(&gateway, &test_context(), &params).await;
        // Fintrack matches the search but is Closed.
        assert_eq!(ids(&page), vec![107, 101]);
    }

    #[tokio::test]
    async fn test_sort_and_paging() {
        let gateway = seeded_gateway();
        let params = LeadListParams {
            sort_by: Some("productName".to_string()),
            sort_order: Some("asc".to_string()),
            page: Some(2),
            limit: Some(3),
            ..Default::default()
        };
        let page = list_leads(&gateway, &test_context(), &params).await;
        // Fintrack, Ledgerly, Legacy | Nimbus, Orbit, Quill | Shipwell
        assert_eq!(ids(&page), vec![104, 105, 107]);
        assert_eq!(page.total, 7);
    }

    #[tokio::test]
    async fn test_refused_list_degrades_to_empty_page() {
        let gateway = seeded_gateway();
        gateway.refuse(Collection::Lead, "Table not accessible");
        let page = list_leads(&gateway, &test_context(), &LeadListParams::default()).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_create_requires_website() {
        let gateway = seeded_gateway();
        let err = create_lead(
            &gateway,
            &test_context(),
            NewLead {
                product_name: "Blank".to_string(),
                website_url: "   ".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Website URL is required");
        assert_eq!(gateway.records(Collection::Lead).len(), 7);
    }

    #[tokio::test]
    async fn test_create_fills_defaults_and_stamps() {
        let gateway = seeded_gateway();
        let lead = create_lead(
            &gateway,
            &test_context(),
            NewLead {
                product_name: "Beacon".to_string(),
                website_url: " https://beacon.io ".to_string(),
                added_by: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(lead.name, "Beacon");
        assert_eq!(lead.website_url, "https://beacon.io");
        assert_eq!(lead.status, "Keep an Eye");
        assert_eq!(lead.team_size, "1-3");
        assert_eq!(lead.created_at, crate::test_utils::now());
        assert_eq!(lead.added_by_id(), Some(2));
        assert_eq!(gateway.records(Collection::Lead).len(), 8);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let gateway = seeded_gateway();
        let ctx = test_context();
        let patch = LeadPatch {
            status: Some("Closed".to_string()),
            follow_up_date: Some(None),
            ..Default::default()
        };
        let updated = update_lead(&gateway, &ctx, 101, &patch).await.unwrap();
        assert_eq!(updated.status, "Closed");
        assert_eq!(updated.follow_up_date, None);
        assert_eq!(updated.category, "Fintech");

        delete_lead(&gateway, &ctx, 101).await.unwrap();
        let err = get_lead(&gateway, &ctx, 101).await.unwrap_err();
        assert!(matches!(err, CrmError::NotFound { id: 101, .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_lead_fails() {
        let gateway = seeded_gateway();
        let patch = LeadPatch {
            status: Some("Closed".to_string()),
            ..Default::default()
        };
        assert!(update_lead(&gateway, &test_context(), 999, &patch)
            .await
            .is_err());
    }
}
