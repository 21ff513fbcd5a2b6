//! OpenAI-compatible chat-completions provider.
//!
//! Works against api.openai.com and any server speaking the same protocol
//! (the base URL is configurable). Streaming uses SSE with
//! `stream_options.include_usage`, so the final data frame carries token
//! usage; it is surfaced as a distinct [`StreamChunk::Usage`].

use async_stream::try_stream;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use undertow_types::TokenUsage;

use crate::provider::{
    CompletionRequest, CompletionResponse, CompletionStream, LlmProvider, Message, StreamChunk,
};
use crate::{IntelligenceError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<Value>,
}

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                IntelligenceError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn wire_request<'a>(request: &'a CompletionRequest, stream: bool) -> WireRequest<'a> {
        WireRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request
                .json_object
                .then(|| serde_json::json!({"type": "json_object"})),
            stream: stream.then_some(true),
            stream_options: stream.then(|| serde_json::json!({"include_usage": true})),
        }
    }

    async fn send(&self, body: &WireRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntelligenceError::Provider(format!(
                "status {status}: {body}"
            )));
        }
        Ok(response)
    }
}

fn parse_usage(value: &Value) -> Option<TokenUsage> {
    let usage = value.get("usage")?;
    if usage.is_null() {
        return None;
    }
    Some(TokenUsage::new(
        usage.get("prompt_tokens").and_then(|v| v.as_u64()).unwrap_or(0),
        usage
            .get("completion_tokens")
            .and_then(|v| v.as_u64())
            .unwrap_or(0),
    ))
}

/// One SSE data frame from the stream body, already stripped of the
/// `data: ` prefix. Yields the delta content and/or usage it carries.
fn parse_stream_frame(frame: &str) -> (Option<String>, Option<TokenUsage>) {
    let Ok(value) = serde_json::from_str::<Value>(frame) else {
        return (None, None);
    };
    let delta = value
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    (delta, parse_usage(&value))
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = Self::wire_request(&request, false);
        let response = self.send(&body).await?;
        let value: Value = response.json().await?;

        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| IntelligenceError::Parse("missing message content".into()))?
            .to_string();
        let usage = parse_usage(&value).unwrap_or_default();

        Ok(CompletionResponse { content, usage })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let body = Self::wire_request(&request, true);
        let response = self.send(&body).await?;
        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer = String::new();
            'outer: while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(IntelligenceError::from)?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = buffer.find('\n') {
                    let line = buffer[..newline].trim().to_string();
                    buffer.drain(..=newline);

                    let Some(frame) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let frame = frame.trim();
                    if frame == "[DONE]" {
                        break 'outer;
                    }
                    let (delta, usage) = parse_stream_frame(frame);
                    if let Some(delta) = delta {
                        yield StreamChunk::Delta(delta);
                    }
                    if let Some(usage) = usage {
                        debug!(
                            input = usage.input_token_count,
                            output = usage.output_token_count,
                            "stream usage received"
                        );
                        yield StreamChunk::Usage(usage);
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}
