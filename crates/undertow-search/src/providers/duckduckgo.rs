//! DuckDuckGo backend: no API key, results scraped from the HTML
//! endpoint. Every category is served by web search; the engine has no
//! public per-type endpoints.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use undertow_fetch::HttpFetcher;
use undertow_types::{language_info, PlannedQuery, SearchHit, TimePeriod};
use url::Url;

use crate::{SearchBackend, SearchError, SearchProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
const BASE_URL: &str = "https://html.duckduckgo.com/html/";

fn time_filter(period: TimePeriod) -> Option<&'static str> {
    match period {
        TimePeriod::AnyTime => None,
        TimePeriod::PastHour | TimePeriod::PastDay => Some("d"),
        TimePeriod::PastWeek => Some("w"),
        TimePeriod::PastMonth => Some("m"),
        TimePeriod::PastYear => Some("y"),
    }
}

pub struct DuckDuckGoProvider {
    fetcher: HttpFetcher,
    base_url: String,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, query: &PlannedQuery) -> Result<Url, SearchError> {
        let lang = language_info(&query.language);
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SearchError::Parse(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.query)
                .append_pair("kl", &format!("{}-{}", lang.gl, lang.hl));
            if let Some(df) = time_filter(query.period) {
                pairs.append_pair("df", df);
            }
        }
        Ok(url)
    }

    fn parse_results(query: &PlannedQuery, html: &str, limit: u32) -> Vec<SearchHit> {
        let document = Html::parse_document(html);
        let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
            Selector::parse(".result"),
            Selector::parse("a.result__a"),
            Selector::parse(".result__snippet"),
        ) else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for result in document.select(&result_sel) {
            let Some(link) = result.select(&link_sel).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let url = resolve_redirect(href);
            if url.is_empty() {
                continue;
            }
            let title = link.text().collect::<String>().trim().to_string();
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            hits.push(SearchHit {
                title,
                url,
                snippet,
                image_url: String::new(),
                date: String::new(),
                language: query.language.clone(),
                kind: query.kind.as_str().to_string(),
                pdf_url: String::new(),
            });
            if hits.len() as u32 >= limit {
                break;
            }
        }
        hits
    }
}

/// DuckDuckGo links point through `/l/?uddg=<encoded target>`; unwrap the
/// target when present, otherwise return the href as-is.
fn resolve_redirect(href: &str) -> String {
    if !href.contains("uddg=") {
        return href.to_string();
    }
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_else(|| href.to_string())
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(
        &self,
        query: &PlannedQuery,
        limit: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.request_url(query)?;
        let response = self
            .fetcher
            .get_with_headers(url.as_str(), &[], self.timeout)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(Self::parse_results(query, &html, limit))
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::DuckDuckGo
    }
}

impl std::fmt::Debug for DuckDuckGoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDuckGoProvider").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"<html><body>
      <div class="result">
        <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc">Example Page</a>
        <a class="result__snippet">A snippet about the page.</a>
      </div>
      <div class="result">
        <a class="result__a" href="https://direct.example.org/x">Direct Link</a>
      </div>
    </body></html>"#;

    #[test]
    fn parses_results_and_unwraps_redirects() {
        let query = PlannedQuery::search("q", "en");
        let hits = DuckDuckGoProvider::parse_results(&query, RESULTS_PAGE, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com/page");
        assert_eq!(hits[0].title, "Example Page");
        assert_eq!(hits[0].snippet, "A snippet about the page.");
        assert_eq!(hits[1].url, "https://direct.example.org/x");
    }

    #[test]
    fn limit_caps_parsed_results() {
        let query = PlannedQuery::search("q", "en");
        let hits = DuckDuckGoProvider::parse_results(&query, RESULTS_PAGE, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn request_url_carries_region_and_time() {
        let fetcher = HttpFetcher::with_defaults().unwrap();
        let provider = DuckDuckGoProvider::new(fetcher);
        let query = PlannedQuery {
            period: TimePeriod::PastWeek,
            ..PlannedQuery::search("rust", "ko")
        };
        let url = provider.request_url(&query).unwrap();
        let qs = url.query().unwrap();
        assert!(qs.contains("kl=kr-ko"));
        assert!(qs.contains("df=w"));
    }
}
