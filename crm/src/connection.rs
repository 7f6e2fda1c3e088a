//! Vendor-neutral connection and record types.

use chrono::{DateTime, NaiveDate, Utc};
use entity::crm_type::CrmType;
use entity::priority::Priority;
use entity::Id;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// An organization's authorized account with one CRM vendor.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: Id,
    pub organization_id: Id,
    pub crm_type: CrmType,
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Vendor account the tokens belong to (GoHighLevel location id)
    pub account_id: Option<String>,
    pub account_name: Option<String>,
}

impl Connection {
    /// True when there is no recorded expiry or it is not in the future.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.token_expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }
}

/// Result of a successful refresh grant, ready to persist.
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CrmTask {
    pub title: String,
    pub body: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default)]
pub struct CrmNote {
    pub body: String,
    pub contact_id: Option<String>,
}

/// Identifier the vendor assigned to a created task or note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn connection(token_expires_at: Option<DateTime<Utc>>) -> Connection {
        Connection {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            crm_type: CrmType::Ghl,
            access_token: SecretString::from("access".to_string()),
            refresh_token: None,
            token_expires_at,
            account_id: None,
            account_name: None,
        }
    }

    #[test]
    fn needs_refresh_when_expiry_missing_or_past() {
        let now = Utc::now();

        assert!(connection(None).needs_refresh(now));
        assert!(connection(Some(now)).needs_refresh(now));
        assert!(connection(Some(now - Duration::minutes(1))).needs_refresh(now));
        assert!(!connection(Some(now + Duration::minutes(1))).needs_refresh(now));
    }
}
