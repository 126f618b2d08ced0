//! LeadPulse: lead, deal and sales-rep analytics over a hosted record store.
//!
//! Records are fetched through a [`gateway::RecordGateway`], normalized by the [`mapper`],
//! aggregated by [`analytics`] and shaped for display by [`reports`]. The [`services`]
//! layer wires those steps together per dashboard view.

pub mod analytics;
pub mod error;
pub mod gateway;
pub mod mapper;
pub mod reports;
pub mod services;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod test_utils;
