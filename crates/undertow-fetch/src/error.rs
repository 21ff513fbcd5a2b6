//! Typed errors surfaced by the fetcher.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("tls error: {0}")]
    Tls(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("http status {0}")]
    Status(u16),

    #[error("body read failed: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout;
        }
        if let Some(status) = e.status() {
            return FetchError::Status(status.as_u16());
        }
        let text = e.to_string();
        let lowered = text.to_lowercase();
        if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
            FetchError::Tls(text)
        } else {
            FetchError::Network(text)
        }
    }
}
