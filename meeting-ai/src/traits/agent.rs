//! Agent trait.

use crate::types::agent::{AgentContext, AgentResult};
use async_trait::async_trait;

/// An automated routine that consumes an `AgentContext` and reports an `AgentResult`.
///
/// Implementations never propagate errors past `execute`; every failure is
/// folded into `AgentResult::failed` so callers handle a single shape.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier used in logs and audit details (e.g., "meeting_mind").
    fn name(&self) -> &str;

    async fn execute(&self, context: AgentContext) -> AgentResult;
}
