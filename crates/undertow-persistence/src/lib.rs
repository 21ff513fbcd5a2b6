//! Crawled-document store.
//!
//! A narrow [`DocumentStore`] port with a PostgreSQL adapter. Writes pass
//! an admission filter first: only URLs that look like durable reference
//! material (news, articles, videos, papers) are worth keeping.

mod postgres;

pub use postgres::PgDocumentStore;

use async_trait::async_trait;
use thiserror::Error;
use undertow_types::CrawledDoc;

/// URL keywords that admit a document into the store.
const ADMITTED_KEYWORDS: &[&str] = &["news", "article", "youtube", "pdf", "arxiv"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// True when the URL qualifies for persistence. The check is on the
/// lowercased URL, so `News.example.com/Article` passes.
pub fn is_admitted(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    let lowered = url.to_lowercase();
    ADMITTED_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Cache read / bulk write port over the `crawled_data` table.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Previously stored document for this URL, if any.
    async fn get(&self, url: &str) -> Result<Option<CrawledDoc>, StoreError>;

    /// Upsert one document. A URL failing the admission filter is
    /// silently skipped.
    async fn put(&self, doc: &CrawledDoc) -> Result<(), StoreError>;

    /// Upsert many documents in one transaction, admission filter
    /// applied per document.
    async fn put_bulk(&self, docs: &[CrawledDoc]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_requires_a_keyword() {
        assert!(is_admitted("https://example.com/news/2024/05/story"));
        assert!(is_admitted("https://site.org/article?id=7"));
        assert!(is_admitted("https://www.youtube.com/watch?v=abc12345678"));
        assert!(is_admitted("https://arxiv.org/pdf/2409.01140"));
        assert!(!is_admitted("https://example.com/blog/post"));
        assert!(!is_admitted(""));
    }

    #[test]
    fn admission_is_case_insensitive() {
        assert!(is_admitted("https://example.com/News/Story"));
        assert!(is_admitted("https://host/files/Paper.PDF"));
    }
}
