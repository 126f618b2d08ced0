use super::{FieldMap, FieldReader, FieldWriter, NAME};
use crate::gateway::Collection;
use crate::types::{Contact, ContactPatch, DEFAULT_CONTACT_STATUS};

pub const EMAIL: &str = "email_c";
pub const COMPANY: &str = "company_c";
pub const STATUS: &str = "status_c";
pub const ASSIGNED_REP: &str = "assigned_rep_c";
pub const NOTES: &str = "notes_c";
pub const CREATED_AT: &str = "created_at_c";

impl FieldMap for Contact {
    const COLLECTION: Collection = Collection::Contact;
    const FIELDS: &'static [&'static str] =
        &[NAME, EMAIL, COMPANY, STATUS, ASSIGNED_REP, NOTES, CREATED_AT];
    type Patch = ContactPatch;

    fn read(f: &mut FieldReader<'_>) -> Self {
        Contact {
            id: f.id(),
            name: f.text(NAME, ""),
            email: f.text(EMAIL, ""),
            company: f.text(COMPANY, ""),
            status: f.text(STATUS, DEFAULT_CONTACT_STATUS),
            assigned_rep: f.lookup(ASSIGNED_REP),
            notes: f.text(NOTES, ""),
            created_at: f.timestamp(CREATED_AT),
        }
    }

    fn write_patch(p: &ContactPatch, out: &mut FieldWriter) {
        if let Some(v) = &p.name {
            out.put_text(NAME, v);
        }
        if let Some(v) = &p.email {
            out.put_text(EMAIL, v);
        }
        if let Some(v) = &p.company {
            out.put_text(COMPANY, v);
        }
        if let Some(v) = &p.status {
            out.put_text(STATUS, v);
        }
        if let Some(v) = p.assigned_rep {
            out.put_lookup_id(ASSIGNED_REP, v);
        }
        if let Some(v) = &p.notes {
            out.put_text(NOTES, v);
        }
    }
}
