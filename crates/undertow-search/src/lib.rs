//! Search provider abstraction for the Undertow pipeline.
//!
//! One [`SearchProvider`] trait, four backends (Serper, SerpApi, Brave,
//! DuckDuckGo), and a [`SearchClient`] that fans a list of planned queries
//! out concurrently, slices per-query top-k, and deduplicates the merged
//! results by URL and by SimHash near-duplicate distance.

mod client;
pub mod providers;
pub mod simhash;

pub use client::{SearchClient, SearchOptions, DEFAULT_SIMHASH_THRESHOLD};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use undertow_fetch::{FetchError, HttpFetcher};
use undertow_types::{PlannedQuery, SearchHit};

/// Domains never worth crawling: social feeds, paywalled aggregators, and
/// bare download links.
pub const DEFAULT_EXCLUDED_DOMAINS: &[&str] = &[
    "namu.wiki",
    "cio.com",
    "FileDown",
    "Download",
    "down",
    "lilys.ai",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "tiktok.com",
];

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing API key for {0}")]
    MissingApiKey(&'static str),

    #[error(transparent)]
    Http(#[from] FetchError),

    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("unparseable provider response: {0}")]
    Parse(String),

    #[error("unknown search backend: {0}")]
    UnknownBackend(String),
}

/// Supported search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    Serper,
    SerpApi,
    Brave,
    DuckDuckGo,
}

impl SearchBackend {
    pub fn parse(name: &str) -> Result<Self, SearchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "serper" => Ok(SearchBackend::Serper),
            "serpapi" | "serp" => Ok(SearchBackend::SerpApi),
            "brave" => Ok(SearchBackend::Brave),
            "duckduckgo" | "ddg" => Ok(SearchBackend::DuckDuckGo),
            other => Err(SearchError::UnknownBackend(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchBackend::Serper => "serper",
            SearchBackend::SerpApi => "serpapi",
            SearchBackend::Brave => "brave",
            SearchBackend::DuckDuckGo => "duckduckgo",
        }
    }
}

/// One search backend. `search` translates the planned query into
/// provider parameters and normalizes the response to [`SearchHit`]s;
/// result filtering and deduplication happen in [`SearchClient`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &PlannedQuery, limit: u32)
        -> Result<Vec<SearchHit>, SearchError>;

    fn backend(&self) -> SearchBackend;
}

/// API keys for the keyed backends.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub serper: Option<String>,
    pub serpapi: Option<String>,
    pub brave: Option<String>,
}

/// Build a provider for the requested backend.
pub fn build_provider(
    backend: SearchBackend,
    fetcher: HttpFetcher,
    keys: &ProviderKeys,
) -> Result<Arc<dyn SearchProvider>, SearchError> {
    match backend {
        SearchBackend::Serper => {
            let key = keys
                .serper
                .clone()
                .ok_or(SearchError::MissingApiKey("serper"))?;
            Ok(Arc::new(providers::SerperProvider::new(key, fetcher)))
        }
        SearchBackend::SerpApi => {
            let key = keys
                .serpapi
                .clone()
                .ok_or(SearchError::MissingApiKey("serpapi"))?;
            Ok(Arc::new(providers::SerpApiProvider::new(key, fetcher)))
        }
        SearchBackend::Brave => {
            let key = keys
                .brave
                .clone()
                .ok_or(SearchError::MissingApiKey("brave"))?;
            Ok(Arc::new(providers::BraveProvider::new(key, fetcher)))
        }
        SearchBackend::DuckDuckGo => {
            Ok(Arc::new(providers::DuckDuckGoProvider::new(fetcher)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parse_accepts_aliases() {
        assert_eq!(SearchBackend::parse("serper").unwrap(), SearchBackend::Serper);
        assert_eq!(SearchBackend::parse("SERP").unwrap(), SearchBackend::SerpApi);
        assert_eq!(SearchBackend::parse("ddg").unwrap(), SearchBackend::DuckDuckGo);
        assert!(SearchBackend::parse("google").is_err());
    }

    #[test]
    fn keyed_backends_require_keys() {
        let fetcher = HttpFetcher::with_defaults().unwrap();
        let err = build_provider(SearchBackend::Serper, fetcher.clone(), &ProviderKeys::default())
            .err()
            .unwrap();
        assert!(matches!(err, SearchError::MissingApiKey("serper")));
        assert!(build_provider(SearchBackend::DuckDuckGo, fetcher, &ProviderKeys::default()).is_ok());
    }
}
