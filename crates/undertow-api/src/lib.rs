//! HTTP service and request pipeline for Undertow.
//!
//! The binary wires an axum router over [`state::AppState`]; every
//! `/websearch` request runs the [`pipeline`] state machine and streams
//! its events back as newline-delimited JSON.

pub mod config;
pub mod crawl;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
