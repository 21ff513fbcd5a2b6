//! LLM abstraction layer for the Undertow pipeline.
//!
//! A vendor-agnostic [`LlmProvider`] trait with streaming support, an
//! OpenAI-compatible HTTP implementation, the query planner and outline
//! generator built on top of it, and a scripted mock provider for tests
//! (behind the `mock` feature).

pub mod catalog;
pub mod outline;
pub mod planner;
pub mod prompts;
pub mod provider;
pub mod providers;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use catalog::{model_id, model_type, model_vendor};
pub use outline::{OutlineGenerator, OutlineOutcome};
pub use planner::{PlannerOutcome, QueryPlanner, N_QUERIES};
pub use provider::{
    CompletionRequest, CompletionResponse, CompletionStream, LlmProvider, Message, Role,
    StreamChunk,
};
pub use providers::OpenAiProvider;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockLlmProvider;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntelligenceError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("unparseable model output: {0}")]
    Parse(String),

    #[error("model call timed out")]
    Timeout,
}

impl From<reqwest::Error> for IntelligenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            IntelligenceError::Timeout
        } else {
            IntelligenceError::Provider(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, IntelligenceError>;
