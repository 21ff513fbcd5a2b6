//! Router-level tests: health endpoint and the NDJSON framing of
//! `/websearch` responses.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use undertow_api::{routes, AppConfig, AppState};
use undertow_fetch::HttpFetcher;
use undertow_intelligence::MockLlmProvider;
use undertow_search::{SearchBackend, SearchError, SearchProvider};
use undertow_types::{Event, PlannedQuery, SearchHit};

struct EmptySearch;

#[async_trait]
impl SearchProvider for EmptySearch {
    async fn search(
        &self,
        _query: &PlannedQuery,
        _limit: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        Ok(Vec::new())
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::Serper
    }
}

fn test_state() -> AppState {
    AppState::new(
        AppConfig::default(),
        HttpFetcher::with_defaults().unwrap(),
        Arc::new(EmptySearch),
        Arc::new(MockLlmProvider::new().always_fail()),
        None,
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let app = routes::router(test_state());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["message"], "Service is healthy");
}

#[tokio::test]
async fn websearch_streams_newline_delimited_events() {
    let app = routes::router(test_state());
    let payload = serde_json::json!({
        "query": "a question long enough to need planning but the model is down \
                  so the stream should fail cleanly with a single terminal event",
        "language": "en",
    });
    let response = app
        .oneshot(
            Request::post("/websearch")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.ends_with('\n'));

    let events: Vec<Event> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is one event"))
        .collect();
    assert!(!events.is_empty());
    let terminals = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminals, 1);
    assert!(events.last().unwrap().is_terminal());
}
