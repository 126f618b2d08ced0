use super::{
    create_raw, degrade, delete_record, fetch_records, get_record, update_raw, ReportContext,
};
use crate::error::CrmError;
use crate::gateway::{RecordGateway, RecordId, SortType};
use crate::mapper::team::{CREATED_AT, UPDATED_AT};
use crate::mapper::{draft_record, patch_record};
use crate::types::{
    NewTeamMember, Permissions, TeamMember, TeamMemberPatch, DEFAULT_MEMBER_ROLE,
    MEMBER_STATUS_ACTIVE, MEMBER_STATUS_INACTIVE, MEMBER_STATUS_PENDING,
};

pub async fn list_team_members(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
) -> Vec<TeamMember> {
    let result =
        fetch_records::<TeamMember>(gateway, ctx, |q| q.order(CREATED_AT, SortType::Desc)).await;
    degrade("team members", result, Vec::new())
}

pub async fn get_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<TeamMember, CrmError> {
    get_record::<TeamMember>(gateway, ctx, id)
        .await
        .map(|m| m.into_inner())
}

/// Invite a member. The account starts pending with dashboard access only unless the
/// invite says otherwise.
pub async fn invite_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    invite: NewTeamMember,
) -> Result<TeamMember, CrmError> {
    let name = invite.name.trim();
    if name.is_empty() {
        return Err(CrmError::Validation("Member name is required".to_string()));
    }
    let email = invite.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CrmError::Validation("Member email is required".to_string()));
    }

    let patch = TeamMemberPatch {
        name: Some(name.to_string()),
        email: Some(email),
        role: Some(
            invite
                .role
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MEMBER_ROLE.to_string()),
        ),
        permissions: Some(invite.permissions.unwrap_or_else(Permissions::dashboard_only)),
        status: Some(MEMBER_STATUS_PENDING.to_string()),
        last_login: Some(None),
    };
    let mut body = draft_record::<TeamMember>(&patch);
    body.insert(CREATED_AT.to_string(), ctx.stamp());
    body.insert(UPDATED_AT.to_string(), ctx.stamp());
    create_raw::<TeamMember>(gateway, ctx, body).await
}

/// Apply `patch` and stamp `updated_at_c`.
pub async fn update_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
    patch: &TeamMemberPatch,
) -> Result<TeamMember, CrmError> {
    let mut body = patch_record::<TeamMember>(id, patch);
    body.insert(UPDATED_AT.to_string(), ctx.stamp());
    update_raw::<TeamMember>(gateway, ctx, body).await
}

fn with_status(status: &str) -> TeamMemberPatch {
    TeamMemberPatch {
        status: Some(status.to_string()),
        ..Default::default()
    }
}

pub async fn activate_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<TeamMember, CrmError> {
    update_team_member(gateway, ctx, id, &with_status(MEMBER_STATUS_ACTIVE)).await
}

pub async fn deactivate_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<TeamMember, CrmError> {
    update_team_member(gateway, ctx, id, &with_status(MEMBER_STATUS_INACTIVE)).await
}

pub async fn remove_team_member(
    gateway: &dyn RecordGateway,
    ctx: &ReportContext,
    id: RecordId,
) -> Result<(), CrmError> {
    delete_record::<TeamMember>(gateway, ctx, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Collection;
    use crate::mapper::team::{EMAIL, PERMISSIONS};
    use crate::services::test_context;
    use crate::test_utils::{now, seeded_gateway};
    use serde_json::Value;

    #[tokio::test]
    async fn test_invite_validates_before_writing() {
        let gateway = seeded_gateway();
        let ctx = test_context();
        let err = invite_team_member(
            &gateway,
            &ctx,
            NewTeamMember {
                name: "  ".to_string(),
                email: "x@y.z".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Member name is required");

        let err = invite_team_member(
            &gateway,
            &ctx,
            NewTeamMember {
                name: "Rui".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Member email is required");
        assert_eq!(gateway.records(Collection::TeamMember).len(), 1);
    }

    #[tokio::test]
    async fn test_invite_normalizes_and_defaults() {
        let gateway = seeded_gateway();
        let member = invite_team_member(
            &gateway,
            &test_context(),
            NewTeamMember {
                name: "  Rui Costa ".to_string(),
                email: " Rui.Costa@LeadPulse.app ".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(member.name, "Rui Costa");
        assert_eq!(member.email, "rui.costa@leadpulse.app");
        assert_eq!(member.role, "viewer");
        assert_eq!(member.status, "pending");
        assert_eq!(member.permissions, Permissions::dashboard_only());
        assert_eq!(member.last_login, None);
        assert_eq!(member.created_at, now());

        let stored = gateway
            .records(Collection::TeamMember)
            .into_iter()
            .find(|r| r.get(EMAIL) == Some(&Value::from("rui.costa@leadpulse.app")))
            .unwrap();
        // Permissions are stored JSON-encoded.
        assert!(stored[PERMISSIONS].is_string());
    }

    #[tokio::test]
    async fn test_status_changes_stamp_updated_at() {
        let gateway = seeded_gateway();
        let ctx = test_context();
        let member = deactivate_team_member(&gateway, &ctx, 401).await.unwrap();
        assert_eq!(member.status, "inactive");
        assert_eq!(member.updated_at, now());
        assert!(member.permissions.analytics);

        let member = activate_team_member(&gateway, &ctx, 401).await.unwrap();
        assert_eq!(member.status, "active");

        remove_team_member(&gateway, &ctx, 401).await.unwrap();
        assert!(list_team_members(&gateway, &ctx).await.is_empty());
    }
}
