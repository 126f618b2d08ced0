use super::{FieldMap, FieldReader, FieldWriter, NAME};
use crate::gateway::Collection;
use crate::types::{TeamMember, TeamMemberPatch, DEFAULT_MEMBER_ROLE, MEMBER_STATUS_PENDING};

pub const EMAIL: &str = "email_c";
pub const ROLE: &str = "role_c";
pub const PERMISSIONS: &str = "permissions_c";
pub const STATUS: &str = "status_c";
pub const CREATED_AT: &str = "created_at_c";
pub const UPDATED_AT: &str = "updated_at_c";
pub const LAST_LOGIN: &str = "last_login_c";

impl FieldMap for TeamMember {
    const COLLECTION: Collection = Collection::TeamMember;
    const FIELDS: &'static [&'static str] = &[
        NAME,
        EMAIL,
        ROLE,
        PERMISSIONS,
        STATUS,
        CREATED_AT,
        UPDATED_AT,
        LAST_LOGIN,
    ];
    type Patch = TeamMemberPatch;

    fn read(f: &mut FieldReader<'_>) -> Self {
        TeamMember {
            id: f.id(),
            name: f.text(NAME, ""),
            email: f.text(EMAIL, ""),
            role: f.text(ROLE, DEFAULT_MEMBER_ROLE),
            permissions: f.decoded(PERMISSIONS),
            status: f.text(STATUS, MEMBER_STATUS_PENDING),
            created_at: f.timestamp(CREATED_AT),
            updated_at: f.timestamp(UPDATED_AT),
            last_login: f.opt_timestamp(LAST_LOGIN),
        }
    }

    fn write_patch(p: &TeamMemberPatch, out: &mut FieldWriter) {
        if let Some(v) = &p.name {
            out.put_text(NAME, v);
        }
        if let Some(v) = &p.email {
            out.put_text(EMAIL, v);
        }
        if let Some(v) = &p.role {
            out.put_text(ROLE, v);
        }
        if let Some(v) = &p.permissions {
            out.put_encoded(PERMISSIONS, v);
        }
        if let Some(v) = &p.status {
            out.put_text(STATUS, v);
        }
        if let Some(v) = p.last_login {
            out.put_opt_timestamp(LAST_LOGIN, v);
        }
    }
}
