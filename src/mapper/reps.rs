use super::{FieldMap, FieldReader, FieldWriter, NAME};
use crate::gateway::Collection;
use crate::types::{conversion_rate, SalesRep, SalesRepPatch};

pub const LEADS_CONTACTED: &str = "leads_contacted_c";
pub const MEETINGS_BOOKED: &str = "meetings_booked_c";
pub const DEALS_CLOSED: &str = "deals_closed_c";
pub const TOTAL_REVENUE: &str = "total_revenue_c";

impl FieldMap for SalesRep {
    const COLLECTION: Collection = Collection::SalesRep;
    const FIELDS: &'static [&'static str] = &[
        NAME,
        LEADS_CONTACTED,
        MEETINGS_BOOKED,
        DEALS_CLOSED,
        TOTAL_REVENUE,
    ];
    type Patch = SalesRepPatch;

    fn read(f: &mut FieldReader<'_>) -> Self {
        let id = f.id();
        let name = f.text(NAME, "");
        let leads_contacted = f.count(LEADS_CONTACTED, 0);
        let meetings_booked = f.count(MEETINGS_BOOKED, 0);
        let deals_closed = f.count(DEALS_CLOSED, 0);
        SalesRep {
            id,
            name,
            leads_contacted,
            meetings_booked,
            deals_closed,
            total_revenue: f.non_negative(TOTAL_REVENUE, 0.0),
            // Recomputed on every read; any stored rate is ignored.
            conversion_rate: conversion_rate(deals_closed, leads_contacted),
        }
    }

    fn write_patch(p: &SalesRepPatch, out: &mut FieldWriter) {
        if let Some(v) = &p.name {
            out.put_text(NAME, v);
        }
        if let Some(v) = p.leads_contacted {
            out.put_count(LEADS_CONTACTED, v);
        }
        if let Some(v) = p.meetings_booked {
            out.put_count(MEETINGS_BOOKED, v);
        }
        if let Some(v) = p.deals_closed {
            out.put_count(DEALS_CLOSED, v);
        }
        if let Some(v) = p.total_revenue {
            out.put_number(TOTAL_REVENUE, v);
        }
    }
}
