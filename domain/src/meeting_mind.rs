//! The agent that turns one meeting's transcript into stored action items.

use crate::error::Error;
use crate::gateway::llm::DeepSeekClient;
use crate::meeting_status::MeetingStatus;
use crate::priority::Priority;
use crate::{action_items, meeting, Id};
use async_trait::async_trait;
use chrono::Utc;
use entity_api::action_item::{self, NewActionItem};
use entity_api::transcript;
use log::*;
use meeting_ai::keyword;
use meeting_ai::traits::agent::Agent;
use meeting_ai::traits::extraction::Provider;
use meeting_ai::{AgentContext, AgentResult, Artifact, ArtifactType, ExtractedActionItem};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use service::config::Config;

pub const AGENT_NAME: &str = "meeting_mind";

fn stored_priority(priority: meeting_ai::Priority) -> Priority {
    match priority {
        meeting_ai::Priority::Low => Priority::Low,
        meeting_ai::Priority::Medium => Priority::Medium,
        meeting_ai::Priority::High => Priority::High,
        meeting_ai::Priority::Urgent => Priority::Urgent,
    }
}

pub struct MeetingMindAgent<'a> {
    db: &'a DatabaseConnection,
    extractor: Option<Box<dyn Provider>>,
}

impl<'a> MeetingMindAgent<'a> {
    pub fn new(db: &'a DatabaseConnection, extractor: Option<Box<dyn Provider>>) -> Self {
        Self { db, extractor }
    }

    /// Uses the LLM when an API key is configured, the keyword extractor otherwise.
    pub fn from_config(db: &'a DatabaseConnection, config: &Config) -> Self {
        let extractor = config.deepseek_api_key().and_then(|api_key| {
            DeepSeekClient::new(config.deepseek_api_url(), &api_key)
                .map(|client| Box::new(client) as Box<dyn Provider>)
                .map_err(|err| warn!("DeepSeek client unavailable, using keyword extraction: {err}"))
                .ok()
        });

        Self::new(db, extractor)
    }

    async fn extract(&self, text: &str) -> (Vec<ExtractedActionItem>, &str) {
        if let Some(extractor) = &self.extractor {
            match extractor.extract_action_items(text).await {
                Ok(items) => return (items, extractor.provider_id()),
                Err(err) => warn!(
                    "{} extraction failed, falling back to keywords: {err}",
                    extractor.provider_id()
                ),
            }
        }

        (keyword::extract_action_items(text), keyword::PROVIDER_ID)
    }

    async fn run(&self, context: &AgentContext) -> Result<(Value, Vec<Artifact>), Error> {
        let (organization_id, _user_id) = context.require_ids()?;
        let meeting_id = context.metadata_uuid("meetingId")?;

        let transcript = transcript::find_by_meeting_id(self.db, organization_id, meeting_id)
            .await?
            .ok_or_else(|| Error::not_found("Transcript not found"))?;

        // Nothing is extracted or stored for a meeting that cannot become analyzed.
        let meeting = meeting::find_by_id(self.db, organization_id, meeting_id).await?;
        meeting::ensure_transition(&meeting, MeetingStatus::Analyzed)?;

        let (extracted, provider) = self.extract(&transcript.raw_text).await;
        debug!(
            "{provider} extracted {} action items for meeting {meeting_id}",
            extracted.len()
        );

        let stored = self
            .persist(organization_id, meeting_id, transcript.id, extracted)
            .await;

        meeting::transition(self.db, meeting, MeetingStatus::Analyzed).await?;

        let data = json!({
            "actionItems": stored,
            "extractedAt": Utc::now().to_rfc3339(),
        });
        let artifact = Artifact {
            artifact_type: ArtifactType::Json,
            content: data.clone(),
            metadata: Some(json!({ "meetingId": meeting_id, "provider": provider })),
        };

        Ok((data, vec![artifact]))
    }

    /// Inserts every item, skipping the ones the database rejects.
    async fn persist(
        &self,
        organization_id: Id,
        meeting_id: Id,
        transcript_id: Id,
        extracted: Vec<ExtractedActionItem>,
    ) -> Vec<action_items::Model> {
        let mut stored = Vec::with_capacity(extracted.len());

        for item in extracted {
            let title = item.title.clone();
            let new_item = NewActionItem {
                title: item.title,
                description: item.description,
                assignee: item.assignee,
                due_date: item.due_date,
                priority: stored_priority(item.priority),
                scope_creep_flag: item.scope_creep_flag,
            };

            match action_item::create(
                self.db,
                organization_id,
                meeting_id,
                Some(transcript_id),
                new_item,
            )
            .await
            {
                Ok(model) => stored.push(model),
                Err(err) => warn!("Skipping action item \"{title}\": {err}"),
            }
        }

        stored
    }
}

#[async_trait]
impl Agent for MeetingMindAgent<'_> {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    async fn execute(&self, context: AgentContext) -> AgentResult {
        match self.run(&context).await {
            Ok((data, artifacts)) => AgentResult::succeeded(data, artifacts),
            Err(err) => {
                error!("{AGENT_NAME} agent failed: {err}");
                AgentResult::failed(err.to_string())
            }
        }
    }
}
