use super::{
    create_raw, degrade, delete_record, fetch_records, get_record, update_raw, ReportContext,
};
use crate::error::CrmError;
use crate::gateway::{RecordGateway, RecordId, SortType};
use crate::mapper::{draft_record, patch_record, NAME};
use crate::types::{NewSalesRep, SalesRep, SalesRepPatch};

/// Every sales rep, by name.
pub(crate) async fn fetch_sales_reps(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
) -> Result<Vec<SalesRep>, CrmError> {
    fetch_records::<SalesRep>(gateway, ctx, |q| q.order(NAME, SortType::Asc)).await
}

pub async fn list_sales_reps(gateway: &dyn RecordGateway, ctx: &ReportContext) -> Vec<SalesRep> {
    degrade("sales reps", fetch_sales_reps(gateway, ctx).await, Vec::new())
}

pub async fn get_sales_rep(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<SalesRep, CrmError> {
    get_record::<SalesRep>(gateway, ctx, id)
        .await
        .map(|m| m.into_inner())
}

pub async fn create_sales_rep(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    rep: NewSalesRep,
) -> Result<SalesRep, CrmError> {
    let body = draft_record::<SalesRep>(&rep.into_patch());
    create_raw::<SalesRep>(gateway, ctx, body).await
}

pub async fn update_sales_rep(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
    patch: &SalesRepPatch,
) -> Result<SalesRep, CrmError> {
    update_raw::<SalesRep>(gateway, ctx, patch_record::<SalesRep>(id, patch)).await
}

pub async fn delete_sales_rep(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    delete_record::<SalesRep>(gateway, ctx, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Collection;
    use crate::services::test_context;
    use crate::test_utils::seeded_gateway;

    #[tokio::test]
    async fn test_list_is_sorted_by_name_with_derived_rate() {
        let gateway = seeded_gateway();
        let reps = list_sales_reps(&gateway, &test_context()).await;
        let names: Vec<&str> = reps.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ines", "Maya", "Omar"]);
        assert!((reps[1].conversion_rate - 30.0).abs() < 1e-9);
        assert_eq!(reps[0].conversion_rate, 0.0);
    }

    #[tokio::test]
    async fn test_refusal_degrades_to_empty() {
        let gateway = seeded_gateway();
        gateway.refuse(Collection::SalesRep, "Table not accessible");
        assert!(list_sales_reps(&gateway, &test_context()).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_update_recomputes_rate() {
        let gateway = seeded_gateway();
        let ctx = test_context();
        let created = create_sales_rep(
            &gateway,
            &ctx,
            NewSalesRep {
                name: "Tess".to_string(),
                leads_contacted: 4,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.conversion_rate, 0.0);

        let patch = SalesRepPatch {
            deals_closed: Some(1),
            ..Default::default()
        };
        let updated = update_sales_rep(&gateway, &ctx, created.id, &patch)
            .await
            .unwrap();
        assert_eq!(updated.conversion_rate, 25.0);

        delete_sales_rep(&gateway, &ctx, created.id).await.unwrap();
        assert!(get_sales_rep(&gateway, &ctx, created.id).await.is_err());
    }
}
