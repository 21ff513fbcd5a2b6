//! Multi-query search client: concurrent fan-out, per-query top-k
//! slicing, and two-stage deduplication of the merged results.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use undertow_types::{PlannedQuery, SearchHit};

use crate::simhash::{hamming, simhash_text};
use crate::{SearchBackend, SearchProvider, DEFAULT_EXCLUDED_DOMAINS};

pub const DEFAULT_SIMHASH_THRESHOLD: u32 = 20;

/// Per-request search tuning.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Results requested from the provider per query.
    pub num_per_query: u32,
    /// When set, YouTube links are answered from transcripts via the
    /// `Videos` endpoint, so web results drop `youtube.com`.
    pub use_youtube_transcript: bool,
    /// Merged-result cap; each of `n` queries contributes `⌊top_k / n⌋`.
    pub top_k: Option<usize>,
    /// Hits whose URL contains any of these strings are dropped.
    pub exclude_domains: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_per_query: 10,
            use_youtube_transcript: false,
            top_k: None,
            exclude_domains: DEFAULT_EXCLUDED_DOMAINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Provider plus options: the search entry point the orchestrator uses.
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    options: SearchOptions,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>, options: SearchOptions) -> Self {
        Self { provider, options }
    }

    pub fn backend(&self) -> SearchBackend {
        self.provider.backend()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn is_excluded(&self, hit: &SearchHit) -> bool {
        if self
            .options
            .exclude_domains
            .iter()
            .any(|domain| hit.url.contains(domain.as_str()))
        {
            return true;
        }
        // Videos results keep their youtube links; everything else loses
        // them once transcripts are in play.
        self.options.use_youtube_transcript
            && hit.kind != "Videos"
            && hit.url.contains("youtube.com")
    }

    /// Single-query search. Provider failures degrade to an empty list so
    /// one bad query cannot sink the fan-out.
    pub async fn search(&self, query: &PlannedQuery) -> Vec<SearchHit> {
        match self.provider.search(query, self.options.num_per_query).await {
            Ok(hits) => hits.into_iter().filter(|h| !self.is_excluded(h)).collect(),
            Err(e) => {
                warn!(
                    backend = self.provider.backend().as_str(),
                    query = %query.query,
                    error = %e,
                    "search query failed"
                );
                Vec::new()
            }
        }
    }

    /// Fan out all queries concurrently, merge with optional top-k
    /// slicing, then deduplicate: first occurrence per URL wins, then a
    /// SimHash pass drops near-duplicates of `title + " " + snippet`.
    /// Output order is the interleaved insertion order of survivors.
    pub async fn multiple_search(
        &self,
        queries: &[PlannedQuery],
        simhash_threshold: u32,
    ) -> Vec<SearchHit> {
        if queries.is_empty() {
            return Vec::new();
        }

        let per_query = join_all(queries.iter().map(|q| self.search(q))).await;
        let slice_len = self.options.top_k.map(|k| k / per_query.len());

        let mut merged = Vec::new();
        for mut hits in per_query {
            match slice_len {
                Some(n) => {
                    hits.truncate(n);
                    merged.extend(hits);
                }
                None => merged.extend(hits),
            }
        }

        let url_deduped = dedup_by_url(merged);
        let survivors = dedup_by_simhash(url_deduped, simhash_threshold);
        debug!(survivors = survivors.len(), "multi-search merge complete");
        survivors
    }
}

fn dedup_by_url(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        if hit.url.is_empty() {
            // No URL to collide on; the hit is kept under its own key.
            out.push(hit);
        } else if seen.insert(hit.url.clone()) {
            out.push(hit);
        }
    }
    out
}

fn dedup_by_simhash(hits: Vec<SearchHit>, threshold: u32) -> Vec<SearchHit> {
    let mut kept_hashes: Vec<u64> = Vec::new();
    let mut out = Vec::with_capacity(hits.len());
    for hit in hits {
        let content = format!("{} {}", hit.title, hit.snippet);
        let content = content.trim();
        if content.is_empty() {
            out.push(hit);
            continue;
        }
        let hash = simhash_text(content);
        if kept_hashes.iter().any(|&h| hamming(hash, h) <= threshold) {
            continue;
        }
        kept_hashes.push(hash);
        out.push(hit);
    }
    out
}
