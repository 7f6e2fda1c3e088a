//! Action-item extraction provider trait.

use crate::types::action_item::ExtractedActionItem;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for turning transcript text into action items.
///
/// LLM-backed implementations live next to their HTTP clients; the keyword
/// extractor in this crate is the offline implementation used as fallback.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn extract_action_items(
        &self,
        transcript: &str,
    ) -> std::result::Result<Vec<ExtractedActionItem>, Error>;

    /// Return unique identifier for this provider (e.g., "deepseek", "keyword").
    fn provider_id(&self) -> &str;
}
