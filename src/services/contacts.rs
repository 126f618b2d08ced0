use super::{
    create_raw, degrade, delete_record, fetch_records, get_record, update_raw, ReportContext,
};
use crate::error::CrmError;
use crate::gateway::{RecordGateway, RecordId, SortType};
use crate::mapper::contacts::{COMPANY, CREATED_AT, EMAIL};
use crate::mapper::{draft_record, patch_record, NAME};
use crate::types::{Contact, ContactPatch, NewContact};

/// Contacts, newest first, optionally narrowed by a search over name, email and company.
pub async fn list_contacts(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    search: Option<&str>,
) -> Vec<Contact> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());
    let result = fetch_records::<Contact>(gateway, ctx, |q| {
        let q = q.order(CREATED_AT, SortType::Desc);
        match search {
            Some(term) => q.search_any(&[NAME, EMAIL, COMPANY], term),
            None => q,
        }
    })
    .await;
    degrade("contacts", result, Vec::new())
}

pub async fn get_contact(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<Contact, CrmError> {
    get_record::<Contact>(gateway, ctx, id)
        .await
        .map(|m| m.into_inner())
}

pub async fn create_contact(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    contact: NewContact,
) -> Result<Contact, CrmError> {
    let mut body = draft_record::<Contact>(&contact.into_patch());
    body.insert(CREATED_AT.to_string(), ctx.stamp());
    create_raw::<Contact>(gateway, ctx, body).await
}

pub async fn update_contact(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
    patch: &ContactPatch,
) -> Result<Contact, CrmError> {
    update_raw::<Contact>(gateway, ctx, patch_record::<Contact>(id, patch)).await
}

pub async fn delete_contact(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    delete_record::<Contact>(gateway, ctx, id).await
}
