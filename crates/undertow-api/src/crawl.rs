//! Crawler: resolves search hits to full text.
//!
//! Resolution order per URL: document-store cache, then the first
//! registered site extractor, then the generic size-capped fetch with
//! content-type dispatch (PDF / HTML / plain text). Failures never
//! propagate; the document's content carries a short diagnostic instead so
//! the caller still sees a row per hit.

use futures::future::join_all;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::spawn_blocking;
use tokio::time::timeout;
use tracing::{debug, info, instrument};
use undertow_extraction::{
    rewrite_arxiv_url, ExtractorRegistry, GenericHtmlExtractor, GenericPdfExtractor,
};
use undertow_fetch::{FetchError, HttpFetcher};
use undertow_persistence::DocumentStore;
use undertow_types::{CrawledDoc, SearchHit};

/// Maximum characters kept per document.
pub const MAX_CONTENT_LENGTH: usize = 20_000;

/// Reject up front anything advertised above this size.
const MAX_ADVERTISED_BYTES: u64 = 25 * 1024 * 1024;
/// Stop reading a body beyond this size, keeping what arrived.
const MAX_DOWNLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Deadline for a site extractor to produce text for one URL.
const SITE_EXTRACT_BUDGET: Duration = Duration::from_secs(10);
/// Deadline for the generic streaming fetch (connect + body).
const GENERIC_FETCH_DEADLINE: Duration = Duration::from_secs(8);
/// CPU budgets for decoders running off the async runtime.
const PDF_DECODE_BUDGET: Duration = Duration::from_millis(1500);
const HTML_DECODE_BUDGET: Duration = Duration::from_millis(500);

#[derive(Debug)]
enum CrawlError {
    Timeout,
    Fetch(FetchError),
    Decode(String),
}

impl CrawlError {
    /// Short diagnostic recorded as the document content.
    fn diagnostic(&self) -> String {
        match self {
            CrawlError::Timeout => "Processing timed out".to_string(),
            CrawlError::Fetch(FetchError::Status(code)) => {
                format!("Failed to fetch with status {code}")
            }
            CrawlError::Fetch(e) => format!("Request failed: {e}"),
            CrawlError::Decode(kind) => format!("Error: {kind}"),
        }
    }
}

impl From<FetchError> for CrawlError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Timeout => CrawlError::Timeout,
            other => CrawlError::Fetch(other),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

pub struct Crawler {
    fetcher: HttpFetcher,
    registry: Arc<ExtractorRegistry>,
    store: Option<Arc<dyn DocumentStore>>,
    max_content_length: usize,
}

impl Crawler {
    pub fn new(
        fetcher: HttpFetcher,
        registry: Arc<ExtractorRegistry>,
        store: Option<Arc<dyn DocumentStore>>,
    ) -> Self {
        Self {
            fetcher,
            registry,
            store,
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }

    /// Resolve one hit to a document. Never fails; errors become a
    /// diagnostic string in `content`.
    #[instrument(skip(self, hit), fields(url = %hit.url))]
    pub async fn crawl(&self, hit: &SearchHit) -> CrawledDoc {
        let mut content = String::new();

        if let Some(store) = &self.store {
            match store.get(&hit.url).await {
                Ok(Some(cached)) if !cached.content.is_empty() => {
                    debug!("cache hit");
                    content = cached.content;
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "cache lookup failed"),
            }
        }

        if content.is_empty() {
            content = match self.resolve(&hit.url).await {
                Ok(text) => text,
                Err(e) => {
                    debug!(error = ?e, "crawl failed");
                    e.diagnostic()
                }
            };
        }

        CrawledDoc::from_hit(hit, truncate_chars(&content, self.max_content_length))
    }

    /// Crawl all hits concurrently, preserving input order.
    pub async fn multiple_crawl(&self, hits: &[SearchHit]) -> Vec<CrawledDoc> {
        let docs = join_all(hits.iter().map(|hit| self.crawl(hit))).await;
        let extracted = docs.iter().filter(|d| !d.content.is_empty()).count();
        info!(extracted, total = docs.len(), "crawl batch finished");
        docs
    }

    async fn resolve(&self, url: &str) -> Result<String, CrawlError> {
        if let Some(extractor) = self.registry.get(url) {
            return timeout(SITE_EXTRACT_BUDGET, extractor.extract(url, &self.fetcher))
                .await
                .map_err(|_| CrawlError::Timeout);
        }
        self.fetch_generic(url).await
    }

    async fn fetch_generic(&self, url: &str) -> Result<String, CrawlError> {
        let fetch_url = rewrite_arxiv_url(url);
        let force_pdf = fetch_url.contains("arxiv.org/pdf");

        let response = self
            .fetcher
            .get_streaming(&fetch_url, GENERIC_FETCH_DEADLINE)
            .await
            .map_err(CrawlError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Fetch(FetchError::Status(status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();

        let advertised = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        if advertised.is_some_and(|len| len > MAX_ADVERTISED_BYTES) {
            return Ok(String::new());
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CrawlError::Fetch(FetchError::Body(e.to_string())))?;
            body.extend_from_slice(&chunk);
            if body.len() > MAX_DOWNLOAD_BYTES {
                body.truncate(MAX_DOWNLOAD_BYTES);
                break;
            }
        }

        if force_pdf || content_type.contains("application/pdf") {
            let text = timeout(
                PDF_DECODE_BUDGET,
                spawn_blocking(move || GenericPdfExtractor::new().convert(&body)),
            )
            .await
            .map_err(|_| CrawlError::Timeout)?
            .map_err(|e| CrawlError::Decode(e.to_string()))?;
            Ok(text)
        } else if content_type.contains("text/html") {
            let html = decode_text(body);
            let text = timeout(
                HTML_DECODE_BUDGET,
                spawn_blocking(move || GenericHtmlExtractor::new().convert(&html)),
            )
            .await
            .map_err(|_| CrawlError::Timeout)?
            .map_err(|e| CrawlError::Decode(e.to_string()))?;
            Ok(text)
        } else if content_type.starts_with("text/") {
            Ok(truncate_chars(&decode_text(body), self.max_content_length))
        } else {
            Ok(String::new())
        }
    }
}
