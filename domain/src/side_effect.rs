//! Outcome of a best-effort secondary action.
//!
//! Audit logging and the CRM sync inside a playbook trigger must never fail the
//! operation that caused them. They report a `SideEffect` next to the primary
//! result so callers and tests can inspect both independently.

use log::*;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SideEffect<T> {
    Completed(T),
    /// Not attempted; the reason says why
    Skipped(String),
    /// Attempted and failed; already logged
    Failed(String),
}

impl<T> SideEffect<T> {
    /// Folds a fallible secondary action into a `SideEffect`, logging a failure with `warn!`.
    pub fn from_result<E: Display>(label: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => SideEffect::Completed(value),
            Err(err) => {
                warn!("{label} failed: {err}");
                SideEffect::Failed(err.to_string())
            }
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        SideEffect::Skipped(reason.into())
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SideEffect::Completed(_))
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            SideEffect::Completed(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_keeps_the_error_message() {
        let effect: SideEffect<()> = SideEffect::from_result("audit log", Err("db down"));

        assert_eq!(effect, SideEffect::Failed("db down".to_string()));
        assert!(!effect.is_completed());
    }

    #[test]
    fn from_result_wraps_success() {
        let effect = SideEffect::from_result::<&str>("crm sync", Ok(3));

        assert_eq!(effect.completed(), Some(&3));
    }

    #[test]
    fn serializes_with_status_tag() {
        let value = serde_json::to_value(SideEffect::<u8>::skipped("not a ghl_sync playbook"))
            .unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "status": "skipped", "detail": "not a ghl_sync playbook" })
        );
    }
}
