//! Core LLM provider trait and request/response types.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use undertow_types::TokenUsage;

use crate::Result;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Map a wire-format role string; anything unrecognized becomes user.
    pub fn from_wire(role: &str, content: impl Into<String>) -> Self {
        let role = match role {
            "system" => Role::System,
            "assistant" => Role::Assistant,
            _ => Role::User,
        };
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Constrain the output to a single JSON object.
    pub json_object: bool,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            json_object: false,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_object(mut self) -> Self {
        self.json_object = true;
        self
    }
}

/// Response from a non-streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// One element of a completion stream. Content arrives as `Delta` chunks;
/// usage arrives exactly once, as its own trailing chunk, never folded
/// into a delta.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Delta(String),
    Usage(TokenUsage),
}

pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Core trait all LLM providers implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Generate a completion as a stream of [`StreamChunk`]s.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
