//! News-site extractors.
//!
//! Most supported newsrooms serve the article body inside one container
//! element, optionally followed by a license footer; those are described by
//! a [`SiteRule`] instead of a bespoke type. BBC (text-block components)
//! and Chosun (Fusion JSON payload) need their own parsing.

use async_trait::async_trait;
use scraper::{Html, Selector};
use undertow_fetch::HttpFetcher;

use crate::text::{collapse_blank_lines, collapse_newlines, cut_at};
use crate::Extractor;

/// How a rule locates the article container.
#[derive(Debug, Clone, Copy)]
pub enum ContentMatcher {
    /// Any element with a CSS class containing this fragment
    /// (case-insensitive).
    ClassFragment(&'static str),
    /// The element with exactly this id.
    IdExact(&'static str),
    /// Any element whose id contains this fragment (case-insensitive).
    IdFragment(&'static str),
}

/// Declarative extraction rule for a single news site.
#[derive(Debug, Clone, Copy)]
pub struct SiteRule {
    /// Substring of the URL that routes to this rule.
    pub domain: &'static str,
    pub matcher: ContentMatcher,
    /// Footer marker; everything from the marker on is dropped.
    pub cut_marker: Option<&'static str>,
    /// Host rewrite applied before fetching (mobile → canonical).
    pub host_rewrite: Option<(&'static str, &'static str)>,
}

/// Extractor driven by a [`SiteRule`].
pub struct SiteArticleExtractor {
    rule: SiteRule,
}

impl SiteArticleExtractor {
    pub fn new(rule: SiteRule) -> Self {
        Self { rule }
    }

    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let Some(container) = find_container(&document, self.rule.matcher) else {
            return String::new();
        };
        let text = collapse_newlines(&container);
        let text = match self.rule.cut_marker {
            Some(marker) => cut_at(&text, marker).to_string(),
            None => text,
        };
        text.trim().to_string()
    }
}

#[async_trait]
impl Extractor for SiteArticleExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains(self.rule.domain)
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        let url = match self.rule.host_rewrite {
            Some((from, to)) => url.replace(from, to),
            None => url.to_string(),
        };
        match fetcher.get_text(&url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

/// Text of the first element matched by `matcher`, descendant text
/// concatenated in document order.
fn find_container(document: &Html, matcher: ContentMatcher) -> Option<String> {
    let all = Selector::parse("*").ok()?;
    for element in document.select(&all) {
        let value = element.value();
        let hit = match matcher {
            ContentMatcher::ClassFragment(fragment) => value
                .classes()
                .any(|c| c.to_lowercase().contains(fragment)),
            ContentMatcher::IdExact(id) => value.id() == Some(id),
            ContentMatcher::IdFragment(fragment) => value
                .id()
                .is_some_and(|id| id.to_lowercase().contains(fragment)),
        };
        if hit {
            return Some(element.text().collect::<String>());
        }
    }
    None
}

/// BBC articles are assembled from `data-component="text-block"` sections.
pub struct BbcNewsExtractor;

impl BbcNewsExtractor {
    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse(r#"[data-component="text-block"]"#) else {
            return String::new();
        };
        let mut full_text = String::new();
        for element in document.select(&selector) {
            full_text.push_str(&element.text().collect::<String>());
            full_text.push('\n');
        }
        collapse_blank_lines(&full_text)
    }
}

#[async_trait]
impl Extractor for BbcNewsExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("bbc.com")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        match fetcher.get_text(url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

/// Chosun serves the article as JSON embedded in the `fusion-metadata`
/// script: `Fusion.globalContent={…};`. The payload is sometimes truncated
/// mid-array, so parsing falls back to repairing the longest balanced
/// prefix.
pub struct ChosunNewsExtractor;

impl ChosunNewsExtractor {
    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("script#fusion-metadata") else {
            return String::new();
        };
        let Some(script) = document.select(&selector).next() else {
            return String::new();
        };
        let script_text = script.text().collect::<String>();

        let Some(start) = script_text.find("Fusion.globalContent=") else {
            return String::new();
        };
        let json_str = &script_text[start + "Fusion.globalContent=".len()..];
        let json_str = match json_str.find(';') {
            Some(end) => &json_str[..end],
            None => json_str,
        };

        let content = serde_json::from_str::<serde_json::Value>(json_str)
            .ok()
            .or_else(|| repair_truncated_json(json_str));
        let Some(content) = content else {
            return String::new();
        };

        let mut parts = Vec::new();
        if let Some(elements) = content.get("content_elements").and_then(|v| v.as_array()) {
            for element in elements {
                if element.get("type").and_then(|t| t.as_str()) == Some("text") {
                    if let Some(text) = element.get("content").and_then(|c| c.as_str()) {
                        parts.push(text.to_string());
                    }
                }
            }
        }
        parts.join("\n\n").trim().to_string()
    }
}

/// Close the longest prefix ending at a `}` whose brackets balance, then
/// try to parse it with the outer array/object terminators appended.
fn repair_truncated_json(json_str: &str) -> Option<serde_json::Value> {
    let bytes = json_str.as_bytes();
    for i in (0..bytes.len()).rev() {
        if bytes[i] != b'}' {
            continue;
        }
        let prefix = &json_str[..=i];
        if prefix.matches('[').count() != prefix.matches(']').count() + 1 {
            continue;
        }
        let candidate = format!("{prefix}]}}");
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&candidate) {
            return Some(value);
        }
    }
    None
}

#[async_trait]
impl Extractor for ChosunNewsExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("chosun.com")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        match fetcher.get_text(url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

const NEWS_RULES: &[SiteRule] = &[
    SiteRule {
        domain: "donga.com",
        matcher: ContentMatcher::ClassFragment("main_view"),
        cut_marker: Some("좋아요"),
        host_rewrite: None,
    },
    SiteRule {
        domain: "news.nate.com",
        matcher: ContentMatcher::ClassFragment("content_view"),
        cut_marker: None,
        host_rewrite: Some(("m.news.nate.com", "news.nate.com")),
    },
    SiteRule {
        domain: "sedaily.com",
        matcher: ContentMatcher::ClassFragment("article_con"),
        cut_marker: Some("< 저작권자 ⓒ 서울경제, 무단 전재 및 재배포 금지 >"),
        host_rewrite: None,
    },
    SiteRule {
        domain: "kmib.co.kr",
        matcher: ContentMatcher::ClassFragment("article_content"),
        cut_marker: Some("GoodNews paper"),
        host_rewrite: None,
    },
    SiteRule {
        domain: "aitimes.com",
        matcher: ContentMatcher::IdExact("article-view-content-div"),
        cut_marker: None,
        host_rewrite: None,
    },
    SiteRule {
        domain: "dongascience.com",
        matcher: ContentMatcher::IdFragment("contents"),
        cut_marker: Some("Copyright"),
        host_rewrite: Some(("m.dongascience.com", "www.dongascience.com")),
    },
    SiteRule {
        domain: "mt.co.kr",
        matcher: ContentMatcher::ClassFragment("article_view"),
        cut_marker: Some("<저작권자 © ‘돈이 보이는 리얼타임 뉴스’ 머니투데이"),
        host_rewrite: None,
    },
    SiteRule {
        domain: "news.sbs.co.kr",
        matcher: ContentMatcher::ClassFragment("w_article_cont"),
        cut_marker: None,
        host_rewrite: None,
    },
    SiteRule {
        domain: "ohmynews.com",
        matcher: ContentMatcher::ClassFragment("atc_view2025"),
        cut_marker: None,
        host_rewrite: None,
    },
];

/// All news extractors in registration order.
pub fn news_extractors() -> Vec<Box<dyn Extractor>> {
    let mut list: Vec<Box<dyn Extractor>> = vec![Box::new(ChosunNewsExtractor)];
    for rule in NEWS_RULES {
        list.push(Box::new(SiteArticleExtractor::new(*rule)));
    }
    list.push(Box::new(BbcNewsExtractor));
    list
}
