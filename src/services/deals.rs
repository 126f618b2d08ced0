use super::{
    create_raw, degrade, delete_record, fetch_records, get_record, update_raw, ReportContext,
};
use crate::error::CrmError;
use crate::gateway::{Predicate, RecordGateway, RecordId, SortType};
use crate::mapper::deals::CREATED_AT;
use crate::mapper::{draft_record, patch_record};
use crate::types::{Deal, DealPatch, NewDeal};

/// Deals, newest first, optionally only those created in `year`.
pub async fn list_deals(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    year: Option<i32>,
) -> Vec<Deal> {
    let result = fetch_records::<Deal>(gateway, ctx, |q| {
        let q = q.order(CREATED_AT, SortType::Desc);
        match year {
            Some(year) => q.filter(Predicate::in_year(CREATED_AT, year)),
            None => q,
        }
    })
    .await;
    degrade("deals", result, Vec::new())
}

pub async fn get_deal(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<Deal, CrmError> {
    get_record::<Deal>(gateway, ctx, id).await.map(|m| m.into_inner())
}

pub async fn create_deal(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    deal: NewDeal,
) -> Result<Deal, CrmError> {
    let mut body = draft_record::<Deal>(&deal.into_patch());
    body.insert(CREATED_AT.to_string(), ctx.stamp());
    create_raw::<Deal>(gateway, ctx, body).await
}

pub async fn update_deal(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
    patch: &DealPatch,
) -> Result<Deal, CrmError> {
    update_raw::<Deal>(gateway, ctx, patch_record::<Deal>(id, patch)).await
}

pub async fn delete_deal(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    delete_record::<Deal>(gateway, ctx, id).await
}
