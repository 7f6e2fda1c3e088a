//! Client for the external transcription function.

use super::bearer_headers;
use crate::error::Error;
use crate::Id;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionRequest<'a> {
    pub meeting_id: Id,
    pub audio_url: &'a str,
    pub organization_id: Id,
}

/// Fields of the function's response the service persists when present.
///
/// A response without `text` means the function stores the transcript itself.
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionOutput {
    pub text: Option<String>,
    pub segments: Option<Value>,
    pub metadata: Option<Value>,
}

impl TranscriptionOutput {
    pub fn from_response(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }
}

pub struct TranscriptionClient {
    client: reqwest::Client,
    function_url: String,
}

impl TranscriptionClient {
    pub fn new(function_url: &str, function_key: Option<&str>) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(key) = function_key {
            builder = builder.default_headers(bearer_headers(key)?);
        }

        Ok(Self {
            client: builder.build()?,
            function_url: function_url.to_string(),
        })
    }

    /// Invokes the function and returns its JSON response unchanged.
    pub async fn transcribe(&self, request: &TranscriptionRequest<'_>) -> Result<Value, Error> {
        debug!("Requesting transcription for meeting {}", request.meeting_id);

        let response = self
            .client
            .post(&self.function_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach transcription function: {:?}", e);
                Error::from(e)
            })?;

        if response.status().is_success() {
            let body: Value = response.json().await?;
            info!("Transcription function accepted meeting {}", request.meeting_id);
            Ok(body)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!("Transcription function: {}", error_text);
            Err(Error::upstream(error_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn transcribe_posts_camel_case_body_with_key() {
        let mut server = Server::new_async().await;
        let meeting_id = Id::new_v4();
        let organization_id = Id::new_v4();
        let mock = server
            .mock("POST", "/transcribe")
            .match_header("authorization", "Bearer fn-key")
            .match_body(Matcher::Json(json!({
                "meetingId": meeting_id,
                "audioUrl": "https://storage.example.com/a.mp3",
                "organizationId": organization_id
            })))
            .with_status(200)
            .with_body(r#"{"text":"hello"}"#)
            .create_async()
            .await;

        let client =
            TranscriptionClient::new(&format!("{}/transcribe", server.url()), Some("fn-key"))
                .unwrap();
        let body = client
            .transcribe(&TranscriptionRequest {
                meeting_id,
                audio_url: "https://storage.example.com/a.mp3",
                organization_id,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body["text"], "hello");
    }

    #[test]
    fn output_without_text_is_empty() {
        let output = TranscriptionOutput::from_response(&json!({ "status": "queued" }));

        assert!(output.text.is_none());
        assert!(output.segments.is_none());
    }

    #[test]
    fn output_reads_segments_and_metadata() {
        let output = TranscriptionOutput::from_response(&json!({
            "text": "hi",
            "segments": [{ "start": 0, "text": "hi" }],
            "metadata": { "model": "voxtral" }
        }));

        assert_eq!(output.text.as_deref(), Some("hi"));
        assert_eq!(output.metadata.unwrap()["model"], "voxtral");
    }
}
