use uuid::Uuid;

pub mod action_items;
pub mod audit_logs;
pub mod crm_connections;
pub mod meetings;
pub mod organizations;
pub mod playbook_runs;
pub mod transcripts;
pub mod user_profiles;

pub mod action_item_status;
pub mod crm_type;
pub mod meeting_status;
pub mod playbook_run_status;
pub mod priority;
pub mod subscription_status;
pub mod user_role;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
