//! Blog-platform extractors: Naver, Tistory, Brunch.

use async_trait::async_trait;
use scraper::{Html, Selector};
use undertow_fetch::HttpFetcher;

use crate::text::collapse_newlines;
use crate::Extractor;

/// Naver blog posts render reliably only on the mobile host. The body sits
/// between the report link and the reaction widget, with the title on the
/// first line of the page text.
pub struct NaverBlogExtractor;

impl NaverBlogExtractor {
    /// Desktop post URLs are rewritten to the mobile host before fetching.
    pub fn mobile_url(url: &str) -> String {
        if url.contains("m.blog.naver.com") {
            url.to_string()
        } else {
            url.replace("blog.naver.com", "m.blog.naver.com")
        }
    }

    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let text = document.root_element().text().collect::<String>();
        let text = collapse_newlines(&text);

        let title = text.lines().next().unwrap_or_default().to_string();
        let start = text.find("신고하기").unwrap_or(0);
        let end = text.find("공감한 사람 보러가기").unwrap_or(text.len());
        if start > end {
            return title;
        }
        let body = text[start..end].replace("신고하기", "");
        format!("{title}\n{}", body.trim()).trim().to_string()
    }
}

#[async_trait]
impl Extractor for NaverBlogExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("blog.naver.com")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        let url = Self::mobile_url(url);
        match fetcher.get_text(&url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

const TISTORY_ARTICLE_CLASS: &str = "tt_article_useless_p_margin";

/// Tistory keeps the post body in a well-known class; themes without it
/// fall back to the usual article/content/post containers.
pub struct TistoryBlogExtractor;

impl TistoryBlogExtractor {
    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let title = Selector::parse("h1")
            .ok()
            .and_then(|s| document.select(&s).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let body = self
            .select_body(&document, &format!("div.{TISTORY_ARTICLE_CLASS}"))
            .or_else(|| self.select_body(&document, r#"[class*="article"]"#))
            .or_else(|| self.select_body(&document, r#"[class*="content"]"#))
            .or_else(|| self.select_body(&document, r#"[class*="post"]"#));
        let Some(body) = body else {
            return String::new();
        };

        let cleaned = collapse_newlines(&body);
        let title = if title.is_empty() {
            cleaned.lines().next().unwrap_or_default().to_string()
        } else {
            title
        };
        format!("{title}\n{cleaned}").trim().to_string()
    }

    fn select_body(&self, document: &Html, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let element = document.select(&selector).next()?;
        let text = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl Extractor for TistoryBlogExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("tistory.com")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        match fetcher.get_text(url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

/// Brunch essays: cover title plus paragraph-level blocks from the body
/// container, with share/utility widgets removed and very short fragments
/// skipped.
pub struct BrunchBlogExtractor;

impl BrunchBlogExtractor {
    fn parse(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        let title = [
            "h1.cover_title",
            ".wrap_cover h1",
            ".article_header h1",
            r#"h1[class*="title"]"#,
        ]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .filter_map(|s| {
            document
                .select(&s)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .find(|t| !t.is_empty())
        .unwrap_or_default();

        let container = [".wrap_body", ".article_body", "#article_body", ".post_body"]
            .iter()
            .filter_map(|s| Selector::parse(s).ok())
            .find_map(|s| document.select(&s).next());
        let Some(container) = container else {
            return title;
        };

        let Ok(blocks) = Selector::parse("p, div, h1, h2, h3, h4, h5, h6, blockquote") else {
            return title;
        };
        let mut paragraphs = Vec::new();
        for element in container.select(&blocks) {
            let text = element.text().collect::<String>().trim().to_string();
            if text.chars().count() > 5 && !paragraphs.contains(&text) {
                paragraphs.push(text);
            }
        }

        let body = paragraphs.join("\n\n");
        format!("{title}\n{body}").trim().to_string()
    }
}

#[async_trait]
impl Extractor for BrunchBlogExtractor {
    fn can_handle(&self, url: &str) -> bool {
        url.contains("brunch.co.kr")
    }

    async fn extract(&self, url: &str, fetcher: &HttpFetcher) -> String {
        match fetcher.get_text(url).await {
            Ok(html) => self.parse(&html),
            Err(_) => String::new(),
        }
    }
}

/// All blog extractors in registration order.
pub fn blog_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(NaverBlogExtractor),
        Box::new(TistoryBlogExtractor),
        Box::new(BrunchBlogExtractor),
    ]
}
