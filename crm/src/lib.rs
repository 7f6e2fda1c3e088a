//! # crm
//!
//! Vendor-neutral access to the CRMs an organization connects:
//! - The `Adapter` capability trait (create task, create note, refresh token,
//!   validate connection) that every vendor implements
//! - `CrmManager`, the registry that resolves an organization's active
//!   connection and dispatches to the matching adapter
//! - The `ConnectionStore` seam through which adapters read and persist tokens
//! - The GoHighLevel adapter and its OAuth helpers
//!
//! ## Architecture
//!
//! This crate has no database access of its own. The `domain` crate implements
//! `ConnectionStore` over the `crm_connections` table and builds a `CrmManager`
//! at start-up from the static list of supported vendors.

pub mod adapter;
pub mod adapters;
pub mod connection;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod storage;

// Re-export commonly used types
pub use adapter::Adapter;
pub use connection::{Connection, CreatedRecord, CrmNote, CrmTask, RefreshedTokens};
pub use entity::crm_type::CrmType;
pub use error::{Error, ErrorKind};
pub use manager::CrmManager;
pub use storage::ConnectionStore;
