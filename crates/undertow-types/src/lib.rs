//! Core data model for the Undertow web-search answering service.
//!
//! This crate holds the plain-data types shared by every other crate:
//! the request payload, planned search queries, search hits and crawled
//! documents, token-usage accounting, the NDJSON event protocol, and the
//! language table used to parameterize search providers and prompts.

pub mod event;
pub mod language;
pub mod query;
pub mod request;
pub mod urls;
pub mod usage;

pub use event::{AnswerMetadata, Delta, Event, Summary, Title};
pub use language::{language_info, LanguageInfo};
pub use query::{PlannedQuery, QueryKind, TimePeriod};
pub use request::{ChatMessage, QueryRequest, SearchType, TopK};
pub use urls::{extract_urls, is_bare_url};
pub use usage::{ModelId, ModelUsage, TokenUsage};

use serde::{Deserialize, Serialize};

/// A single result returned by a search provider, normalized across
/// backends. `url` is unique within a post-dedup result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub image_url: String,
    pub date: String,
    pub language: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pdf_url: String,
}

impl SearchHit {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// A search hit resolved to full text. The provider-internal `type` and
/// `language` fields are dropped at this stage; only the fields the answer
/// prompt and the document store need survive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawledDoc {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub image_url: String,
    pub date: String,
    pub pdf_url: String,
    pub content: String,
}

impl CrawledDoc {
    /// Build a crawled document from a hit plus extracted content.
    pub fn from_hit(hit: &SearchHit, content: impl Into<String>) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            snippet: hit.snippet.clone(),
            image_url: hit.image_url.clone(),
            date: hit.date.clone(),
            pdf_url: hit.pdf_url.clone(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_hit_kind_serializes_as_type() {
        let hit = SearchHit {
            kind: "Search".into(),
            ..SearchHit::new("https://example.com")
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["type"], "Search");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn crawled_doc_drops_kind_and_language() {
        let hit = SearchHit {
            title: "t".into(),
            kind: "News".into(),
            language: "ko".into(),
            ..SearchHit::new("https://example.com/a")
        };
        let doc = CrawledDoc::from_hit(&hit, "body");
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("type").is_none());
        assert!(json.get("language").is_none());
        assert_eq!(json["content"], "body");
    }
}
