//! Scripted LLM provider for tests.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use undertow_types::TokenUsage;

use crate::provider::{
    CompletionRequest, CompletionResponse, CompletionStream, LlmProvider, StreamChunk,
};
use crate::{IntelligenceError, Result};

/// Mock provider returning scripted completions in order. When the script
/// runs dry the last response repeats, so a single-response mock serves
/// any number of calls.
pub struct MockLlmProvider {
    name: String,
    responses: Mutex<VecDeque<CompletionResponse>>,
    last: Mutex<Option<CompletionResponse>>,
    stream_chunks: Mutex<Vec<StreamChunk>>,
    request_count: AtomicU32,
    should_fail: bool,
    timeout_when_exhausted: bool,
}

impl MockLlmProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            stream_chunks: Mutex::new(Vec::new()),
            request_count: AtomicU32::new(0),
            should_fail: false,
            timeout_when_exhausted: false,
        }
    }

    /// Queue one completion response.
    pub fn with_completion(self, content: impl Into<String>, usage: TokenUsage) -> Self {
        self.responses
            .lock()
            .expect("mock lock")
            .push_back(CompletionResponse {
                content: content.into(),
                usage,
            });
        self
    }

    /// Script the chunks returned by `complete_stream`.
    pub fn with_stream(self, chunks: Vec<StreamChunk>) -> Self {
        *self.stream_chunks.lock().expect("mock lock") = chunks;
        self
    }

    /// Fail every call.
    pub fn always_fail(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Time out once the scripted responses run dry instead of repeating
    /// the last one.
    pub fn then_timeout(mut self) -> Self {
        self.timeout_when_exhausted = true;
        self
    }

    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::SeqCst)
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(IntelligenceError::Provider("scripted failure".into()));
        }
        let mut responses = self.responses.lock().expect("mock lock");
        let response = match responses.pop_front() {
            Some(r) => {
                *self.last.lock().expect("mock lock") = Some(r.clone());
                r
            }
            None if self.timeout_when_exhausted => return Err(IntelligenceError::Timeout),
            None => self
                .last
                .lock()
                .expect("mock lock")
                .clone()
                .unwrap_or(CompletionResponse {
                    content: String::new(),
                    usage: TokenUsage::default(),
                }),
        };
        Ok(response)
    }

    async fn complete_stream(&self, _request: CompletionRequest) -> Result<CompletionStream> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(IntelligenceError::Provider("scripted failure".into()));
        }
        let chunks = self.stream_chunks.lock().expect("mock lock").clone();
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn scripted_responses_pop_in_order_then_repeat() {
        let mock = MockLlmProvider::new()
            .with_completion("first", TokenUsage::new(1, 1))
            .with_completion("second", TokenUsage::new(2, 2));
        let req = CompletionRequest::new("m", vec![Message::user("x")]);
        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "first");
        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "second");
        assert_eq!(mock.complete(req).await.unwrap().content, "second");
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn stream_replays_scripted_chunks() {
        let mock = MockLlmProvider::new().with_stream(vec![
            StreamChunk::Delta("a".into()),
            StreamChunk::Usage(TokenUsage::new(5, 1)),
        ]);
        let chunks: Vec<StreamChunk> = mock
            .complete_stream(CompletionRequest::new("m", vec![]))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn always_fail_fails() {
        let mock = MockLlmProvider::new().always_fail();
        assert!(mock
            .complete(CompletionRequest::new("m", vec![]))
            .await
            .is_err());
    }
}
