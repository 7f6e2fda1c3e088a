//! This module re-exports the entity models from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with the data model within the domain layer, while the
//! underlying persistence details remain in the `entity_api` crate.
pub use entity_api::{
    action_item_status, action_items, audit_logs, crm_connections, crm_type, meeting_status,
    meetings, organizations, playbook_run_status, playbook_runs, priority, subscription_status,
    transcripts, user_profiles, user_role, Id,
};

pub use entity_api::seed_database;

pub mod audit;
pub mod billing;
pub mod crm_connection;
pub mod dashboard;
pub mod error;
pub mod jwt;
pub mod meeting;
pub mod meeting_mind;
pub mod playbook;
pub mod side_effect;
pub mod tenancy;

pub mod gateway;
