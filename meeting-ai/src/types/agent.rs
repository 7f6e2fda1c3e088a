//! Request/response envelope shared by every agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::Error;

/// Input handed to an agent invocation.
///
/// Identifiers are optional on the wire; `require_ids` enforces their
/// presence before an agent does any work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentContext {
    pub organization_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AgentContext {
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            organization_id: Some(organization_id),
            user_id: Some(user_id),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Returns `(organization_id, user_id)` or `InvalidContext` if either is missing.
    pub fn require_ids(&self) -> Result<(Uuid, Uuid), Error> {
        match (self.organization_id, self.user_id) {
            (Some(organization_id), Some(user_id)) => Ok((organization_id, user_id)),
            _ => Err(Error::InvalidContext(
                "Missing organizationId or userId in context".to_string(),
            )),
        }
    }

    /// Reads a UUID stored as a string under `key` in the metadata map.
    pub fn metadata_uuid(&self, key: &str) -> Result<Uuid, Error> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| Error::InvalidContext(format!("Missing {key} in context metadata")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactType {
    Json,
    Task,
    Note,
    Chart,
    Report,
}

/// A by-product of an agent run kept for audit and traceability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Outcome of an agent invocation. Agents report failure here rather than
/// returning an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

impl AgentResult {
    pub fn succeeded(data: Value, artifacts: Vec<Artifact>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            artifacts,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            artifacts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_ids_rejects_missing_user() {
        let context = AgentContext {
            organization_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let err = context.require_ids().unwrap_err();
        assert!(matches!(err, Error::InvalidContext(_)));
    }

    #[test]
    fn metadata_uuid_reads_string_values() {
        let meeting_id = Uuid::new_v4();
        let context = AgentContext::new(Uuid::new_v4(), Uuid::new_v4())
            .with_metadata("meetingId", meeting_id.to_string());

        assert_eq!(context.metadata_uuid("meetingId").unwrap(), meeting_id);
        assert!(context.metadata_uuid("transcriptId").is_err());
    }

    #[test]
    fn context_deserializes_from_camel_case() {
        let organization_id = Uuid::new_v4();
        let context: AgentContext = serde_json::from_value(json!({
            "organizationId": organization_id,
            "metadata": { "meetingId": "abc" }
        }))
        .unwrap();

        assert_eq!(context.organization_id, Some(organization_id));
        assert_eq!(context.user_id, None);
        assert_eq!(context.metadata["meetingId"], "abc");
    }

    #[test]
    fn failed_result_serializes_without_data_or_artifacts() {
        let value = serde_json::to_value(AgentResult::failed("Transcript not found")).unwrap();

        assert_eq!(
            value,
            json!({ "success": false, "error": "Transcript not found" })
        );
    }

    #[test]
    fn artifact_type_serializes_under_type_key() {
        let artifact = Artifact {
            artifact_type: ArtifactType::Json,
            content: json!({ "count": 1 }),
            metadata: None,
        };

        let value = serde_json::to_value(artifact).unwrap();
        assert_eq!(value["type"], "json");
        assert!(value.get("metadata").is_none());
    }
}
