//! Meeting AI abstraction layer for transcript analysis agents.
//!
//! This crate provides the provider-agnostic pieces of the analysis pipeline:
//! - The agent envelope (`AgentContext` in, `AgentResult` out) every automated
//!   routine honors
//! - The `Agent` and extraction `Provider` traits
//! - The deterministic keyword extractor used whenever no LLM is available
//!
//! Persistence and concrete LLM clients live in the `domain` crate; nothing here
//! touches the database or the network.

pub mod error;
pub mod keyword;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use keyword::KeywordExtractor;
pub use types::action_item::{ExtractedActionItem, Priority};
pub use types::agent::{AgentContext, AgentResult, Artifact, ArtifactType};
