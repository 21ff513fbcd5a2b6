//! Outline generation: proposes answer sub-headings from merged search
//! snippets. Never fails; any model or parse error degrades to an empty
//! outline.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use undertow_types::TokenUsage;

use crate::prompts::{render, OUTLINE_PROMPT};
use crate::provider::{CompletionRequest, LlmProvider, Message};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutlineOutcome {
    pub sub_titles: Vec<String>,
    pub usage: TokenUsage,
}

pub struct OutlineGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
}

impl OutlineGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens: 8000,
        }
    }

    /// Propose sub-headings for `query` grounded in `content` (merged
    /// `title: snippet` lines, or a crawled page in URL-only mode).
    pub async fn generate(
        &self,
        query: &str,
        content: &str,
        target_language: &str,
    ) -> OutlineOutcome {
        let prompt = render(
            OUTLINE_PROMPT,
            &[
                ("query", query),
                ("content", content),
                ("target_language", target_language),
            ],
        );
        let request = CompletionRequest::new(self.model.as_str(), vec![Message::user(prompt)])
            .with_max_tokens(self.max_tokens)
            .with_temperature(1.0)
            .with_json_object();

        match self.provider.complete(request).await {
            Ok(response) => OutlineOutcome {
                sub_titles: parse_sub_titles(&response.content),
                usage: response.usage,
            },
            Err(e) => {
                warn!(error = %e, "outline generation failed");
                OutlineOutcome::default()
            }
        }
    }
}

fn parse_sub_titles(content: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<Value>(content) else {
        warn!("outline output was not valid JSON");
        return Vec::new();
    };
    value
        .get("sub_titles")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}
