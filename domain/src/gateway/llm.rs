//! DeepSeek chat-completions client used for action-item extraction.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::*;
use meeting_ai::traits::extraction::Provider;
use meeting_ai::{Error, ExtractedActionItem, Priority};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

pub const MODEL: &str = "deepseek-chat";
pub const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You extract action items from meeting transcripts. \
Respond with a JSON array only. Each element is an object with the keys \
\"title\" (short imperative sentence), \"description\" (string or null), \
\"assignee\" (person's name or null), \"due_date\" (YYYY-MM-DD or null), \
\"priority\" (one of \"low\", \"medium\", \"high\", \"urgent\") and \
\"scope_creep_flag\" (true when the item expands beyond the meeting's original agenda).";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// One element of the array the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ModelActionItem {
    title: Option<String>,
    description: Option<String>,
    assignee: Option<String>,
    due_date: Option<String>,
    priority: Option<String>,
    #[serde(default)]
    scope_creep_flag: bool,
}

impl ModelActionItem {
    fn into_extracted(self) -> Option<ExtractedActionItem> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        Some(ExtractedActionItem {
            title,
            description: self.description,
            assignee: self.assignee,
            due_date: self
                .due_date
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()),
            priority: self
                .priority
                .as_deref()
                .map(Priority::from_label)
                .unwrap_or_default(),
            scope_creep_flag: self.scope_creep_flag,
        })
    }
}

/// Parses the outermost `[...]` of the model's reply into action items.
///
/// Elements without a title are dropped; unparseable dates are ignored.
pub fn parse_action_items(content: &str) -> Result<Vec<ExtractedActionItem>, Error> {
    let (Some(start), Some(end)) = (content.find('['), content.rfind(']')) else {
        return Err(Error::InvalidResponse(
            "No JSON array in model response".to_string(),
        ));
    };
    if end < start {
        return Err(Error::InvalidResponse(
            "No JSON array in model response".to_string(),
        ));
    }

    let items: Vec<ModelActionItem> = serde_json::from_str(&content[start..=end])?;
    Ok(items
        .into_iter()
        .filter_map(ModelActionItem::into_extracted)
        .collect())
}

pub struct DeepSeekClient {
    client: reqwest::Client,
    api_url: String,
}

impl DeepSeekClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut header_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| Error::Configuration("Invalid DeepSeek API key format".to_string()))?;
        header_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }
}

#[async_trait]
impl Provider for DeepSeekClient {
    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> std::result::Result<Vec<ExtractedActionItem>, Error> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: transcript,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("DeepSeek API ({status}): {error_text}");
            return Err(match status.as_u16() {
                401 | 403 => Error::Authentication(error_text),
                _ => Error::Provider(error_text),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("Empty model response".to_string()))?;

        parse_action_items(&content)
    }

    fn provider_id(&self) -> &str {
        "deepseek"
    }
}
