//! Content extraction for crawled URLs.
//!
//! An [`Extractor`] claims a URL via `can_handle` and resolves it to plain
//! text. Extractors never fail: any error inside one degrades to an empty
//! string so the crawl of other URLs is unaffected. The
//! [`ExtractorRegistry`] dispatches to the first registered extractor that
//! claims a URL; the generic HTML/PDF converters in [`html`] and [`pdf`]
//! back the content-type fallback path of the crawler.

pub mod blogs;
pub mod html;
pub mod pdf;
pub mod sites;
pub mod text;
pub mod wiki;
pub mod youtube;

use async_trait::async_trait;
use undertow_fetch::HttpFetcher;

pub use html::GenericHtmlExtractor;
pub use pdf::GenericPdfExtractor;

/// A site-specific content extractor.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Whether this extractor handles the given URL.
    fn can_handle(&self, url: &str) -> bool;

    /// Resolve the URL to plain text. Returns `""` on any failure.
    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String;
}

/// Ordered, first-match-wins extractor registry. Built once at startup and
/// shared immutably afterwards.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// First registered extractor claiming the URL, if any.
    pub fn get(&self, url: &str) -> Option<&dyn Extractor> {
        self.extractors
            .iter()
            .find(|e| e.can_handle(url))
            .map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

/// Registry with every built-in site extractor, in dispatch order: news
/// sites, blogs, then media (YouTube, Wikipedia).
pub fn default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    for extractor in sites::news_extractors() {
        registry.register(extractor);
    }
    for extractor in blogs::blog_extractors() {
        registry.register(extractor);
    }
    registry.register(Box::new(youtube::YoutubeExtractor::new()));
    registry.register(Box::new(wiki::WikipediaExtractor));
    registry
}

/// `arxiv.org/abs/…` pages are served as HTML stubs; the PDF carries the
/// paper. Rewrites to the `/pdf/` form, leaving other URLs untouched.
pub fn rewrite_arxiv_url(url: &str) -> String {
    if url.contains("arxiv.org/abs") {
        url.replace("/abs/", "/pdf/")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor {
        domain: &'static str,
        body: &'static str,
    }

    #[async_trait]
    impl Extractor for FixedExtractor {
        fn can_handle(&self, url: &str) -> bool {
            url.contains(self.domain)
        }

        async fn extract(&self, _url: &str, _fetcher: &HttpFetcher) -> String {
            self.body.to_string()
        }
    }

    #[test]
    fn first_match_wins() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Box::new(FixedExtractor {
            domain: "example.com",
            body: "first",
        }));
        registry.register(Box::new(FixedExtractor {
            domain: "example.com",
            body: "second",
        }));
        assert!(registry.get("https://example.com/a").is_some());
        assert!(registry.get("https://other.net/a").is_none());
    }

    #[test]
    fn default_registry_routes_known_sites() {
        let registry = default_registry();
        assert!(registry.get("https://blog.naver.com/abc").is_some());
        assert!(registry.get("https://www.bbc.com/news/articles/x").is_some());
        assert!(registry.get("https://www.youtube.com/watch?v=A1S19JzHN2M").is_some());
        assert!(registry.get("https://en.wikipedia.org/wiki/Rust").is_some());
        assert!(registry.get("https://unknown-site.io/post").is_none());
    }

    #[test]
    fn arxiv_abs_rewritten_to_pdf() {
        assert_eq!(
            rewrite_arxiv_url("https://arxiv.org/abs/2409.01140"),
            "https://arxiv.org/pdf/2409.01140"
        );
        assert_eq!(
            rewrite_arxiv_url("https://example.com/abs/x"),
            "https://example.com/abs/x"
        );
    }
}
