use super::{FieldMap, FieldReader, FieldWriter, NAME};
use crate::gateway::Collection;
use crate::types::{
    Lead, LeadPatch, DEFAULT_EDITION, DEFAULT_FUNDING_TYPE, DEFAULT_LEAD_STATUS,
    DEFAULT_TEAM_SIZE,
};

pub const PRODUCT_NAME: &str = "product_name_c";
pub const WEBSITE_URL: &str = "website_url_c";
pub const TEAM_SIZE: &str = "team_size_c";
pub const ARR: &str = "arr_c";
pub const CATEGORY: &str = "category_c";
pub const LINKEDIN_URL: &str = "linkedin_url_c";
pub const STATUS: &str = "status_c";
pub const FUNDING_TYPE: &str = "funding_type_c";
pub const EDITION: &str = "edition_c";
pub const FOLLOW_UP_DATE: &str = "follow_up_date_c";
pub const CREATED_AT: &str = "created_at_c";
pub const ADDED_BY: &str = "added_by_c";

impl FieldMap for Lead {
    const COLLECTION: Collection = Collection::Lead;
    const FIELDS: &'static [&'static str] = &[
        NAME,
        PRODUCT_NAME,
        WEBSITE_URL,
        TEAM_SIZE,
        ARR,
        CATEGORY,
        LINKEDIN_URL,
        STATUS,
        FUNDING_TYPE,
        EDITION,
        FOLLOW_UP_DATE,
        CREATED_AT,
        ADDED_BY,
    ];
    type Patch = LeadPatch;

    fn read(f: &mut FieldReader<'_>) -> Self {
        Lead {
            id: f.id(),
            name: f.text(NAME, ""),
            product_name: f.text(PRODUCT_NAME, ""),
            website_url: f.text(WEBSITE_URL, ""),
            team_size: f.text(TEAM_SIZE, DEFAULT_TEAM_SIZE),
            arr: f.non_negative(ARR, 0.0),
            category: f.text(CATEGORY, ""),
            linkedin_url: f.text(LINKEDIN_URL, ""),
            status: f.text(STATUS, DEFAULT_LEAD_STATUS),
            funding_type: f.text(FUNDING_TYPE, DEFAULT_FUNDING_TYPE),
            edition: f.text(EDITION, DEFAULT_EDITION),
            follow_up_date: f.opt_date(FOLLOW_UP_DATE),
            created_at: f.timestamp(CREATED_AT),
            added_by: f.lookup(ADDED_BY),
        }
    }

    fn write_patch(p: &LeadPatch, out: &mut FieldWriter) {
        if let Some(v) = &p.name {
            out.put_text(NAME, v);
        }
        if let Some(v) = &p.product_name {
            out.put_text(PRODUCT_NAME, v);
        }
        if let Some(v) = &p.website_url {
            out.put_text(WEBSITE_URL, v);
        }
        if let Some(v) = &p.team_size {
            out.put_text(TEAM_SIZE, v);
        }
        if let Some(v) = p.arr {
            out.put_number(ARR, v);
        }
        if let Some(v) = &p.category {
            out.put_text(CATEGORY, v);
        }
        if let Some(v) = &p.linkedin_url {
            out.put_text(LINKEDIN_URL, v);
        }
        if let Some(v) = &p.status {
            out.put_text(STATUS, v);
        }
        if let Some(v) = &p.funding_type {
            out.put_text(FUNDING_TYPE, v);
        }
        if let Some(v) = &p.edition {
            out.put_text(EDITION, v);
        }
        if let Some(v) = p.follow_up_date {
            out.put_opt_date(FOLLOW_UP_DATE, v);
        }
        if let Some(v) = p.added_by {
            out.put_lookup_id(ADDED_BY, v);
        }
    }
}
