//! HTTP surface: `/websearch` (NDJSON event stream) and `/health`.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use tower_http::trace::TraceLayer;
use tracing::info;
use undertow_types::QueryRequest;

use crate::pipeline;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/websearch", post(websearch))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Service is healthy"
    }))
}

async fn websearch(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    info!(query = %request.query, stream = request.stream, "/websearch called");

    let events = pipeline::run(state, request)
        .map(|event| Ok::<_, Infallible>(Bytes::from(event.to_json_line())));

    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(events))
    {
        Ok(response) => response,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
