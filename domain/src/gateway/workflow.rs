//! n8n workflow webhook client.

use crate::error::Error;
use log::*;
use serde_json::Value;

/// How the workflow engine answered a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Accepted { execution_id: Option<String> },
    /// Non-success status; `status_text` is the HTTP reason phrase
    Rejected { status: u16, status_text: String },
}

pub struct WorkflowClient {
    client: reqwest::Client,
    webhook_url: String,
}

/// Execution id from `executionId`, else `id`; numbers are stringified.
fn execution_id(body: &Value) -> Option<String> {
    ["executionId", "id"]
        .iter()
        .filter_map(|key| body.get(key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

impl WorkflowClient {
    pub fn new(webhook_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            webhook_url: webhook_url.to_string(),
        })
    }

    /// POSTs `body` to the webhook once. Transport failures are errors; a
    /// non-success status is a `Rejected` outcome.
    pub async fn trigger(&self, body: &Value) -> Result<WebhookOutcome, Error> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach n8n webhook: {:?}", e);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("n8n webhook ({status}): {error_text}");
            return Ok(WebhookOutcome::Rejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        // n8n may answer with an empty or non-JSON body
        let text = response.text().await.unwrap_or_default();
        let execution_id = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(execution_id);

        debug!("n8n accepted trigger, execution id {execution_id:?}");
        Ok(WebhookOutcome::Accepted { execution_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn execution_id_prefers_execution_id_over_id() {
        assert_eq!(
            execution_id(&json!({ "executionId": "e-1", "id": "x" })).as_deref(),
            Some("e-1")
        );
        assert_eq!(execution_id(&json!({ "id": 42 })).as_deref(), Some("42"));
        assert_eq!(execution_id(&json!({ "ok": true })), None);
    }

    #[tokio::test]
    async fn trigger_posts_body_and_reads_execution_id() {
        let mut server = Server::new_async().await;
        let body = json!({ "playbookType": "ghl_sync" });
        let mock = server
            .mock("POST", "/webhook/playbooks")
            .match_body(Matcher::Json(body.clone()))
            .with_status(200)
            .with_body(r#"{"executionId":"exec-77"}"#)
            .create_async()
            .await;

        let client = WorkflowClient::new(&format!("{}/webhook/playbooks", server.url())).unwrap();
        let outcome = client.trigger(&body).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            outcome,
            WebhookOutcome::Accepted {
                execution_id: Some("exec-77".to_string())
            }
        );
    }

    #[tokio::test]
    async fn non_success_is_rejected_with_reason_phrase() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(503)
            .with_body("workflow inactive")
            .create_async()
            .await;

        let client = WorkflowClient::new(&format!("{}/hook", server.url())).unwrap();
        let outcome = client.trigger(&json!({})).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Rejected {
                status: 503,
                status_text: "Service Unavailable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn empty_success_body_has_no_execution_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .create_async()
            .await;

        let client = WorkflowClient::new(&format!("{}/hook", server.url())).unwrap();

        assert_eq!(
            client.trigger(&json!({})).await.unwrap(),
            WebhookOutcome::Accepted { execution_id: None }
        );
    }
}
