use super::{FieldMap, FieldReader, FieldWriter, NAME};
use crate::gateway::Collection;
use crate::types::{
    Deal, DealPatch, DEFAULT_DEAL_STAGE, DEFAULT_EDITION, DEFAULT_END_MONTH, DEFAULT_START_MONTH,
};

pub const LEAD_NAME: &str = "lead_name_c";
pub const LEAD_ID: &str = "lead_id_c";
pub const VALUE: &str = "value_c";
pub const STAGE: &str = "stage_c";
pub const EDITION: &str = "edition_c";
pub const START_MONTH: &str = "start_month_c";
pub const END_MONTH: &str = "end_month_c";
pub const CREATED_AT: &str = "created_at_c";
pub const ASSIGNED_REP: &str = "assigned_rep_c";

impl FieldMap for Deal {
    const COLLECTION: Collection = Collection::Deal;
    const FIELDS: &'static [&'static str] = &[
        NAME,
        LEAD_NAME,
        LEAD_ID,
        VALUE,
        STAGE,
        EDITION,
        START_MONTH,
        END_MONTH,
        CREATED_AT,
        ASSIGNED_REP,
    ];
    type Patch = DealPatch;

    fn read(f: &mut FieldReader<'_>) -> Self {
        Deal {
            id: f.id(),
            name: f.text(NAME, ""),
            lead_name: f.text(LEAD_NAME, ""),
            lead_id: f.text(LEAD_ID, ""),
            value: f.number(VALUE, 0.0),
            stage: f.text(STAGE, DEFAULT_DEAL_STAGE),
            edition: f.text(EDITION, DEFAULT_EDITION),
            start_month: f.count(START_MONTH, DEFAULT_START_MONTH),
            end_month: f.count(END_MONTH, DEFAULT_END_MONTH),
            created_at: f.timestamp(CREATED_AT),
            assigned_rep: f.lookup(ASSIGNED_REP),
        }
    }

    fn write_patch(p: &DealPatch, out: &mut FieldWriter) {
        if let Some(v) = &p.name {
            out.put_text(NAME, v);
        }
        if let Some(v) = &p.lead_name {
            out.put_text(LEAD_NAME, v);
        }
        if let Some(v) = &p.lead_id {
            out.put_text(LEAD_ID, v);
        }
        if let Some(v) = p.value {
            out.put_number(VALUE, v);
        }
        if let Some(v) = &p.stage {
            out.put_text(STAGE, v);
        }
        if let Some(v) = &p.edition {
            out.put_text(EDITION, v);
        }
        if let Some(v) = p.start_month {
            out.put_count(START_MONTH, v);
        }
        if let Some(v) = p.end_month {
            out.put_count(END_MONTH, v);
        }
        if let Some(v) = p.assigned_rep {
            out.put_lookup_id(ASSIGNED_REP, v);
        }
    }
}
