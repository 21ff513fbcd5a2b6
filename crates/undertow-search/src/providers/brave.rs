//! Brave Search API backend.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use undertow_fetch::HttpFetcher;
use undertow_types::{language_info, PlannedQuery, QueryKind, SearchHit, TimePeriod};
use url::Url;

use super::str_field;
use crate::{SearchBackend, SearchError, SearchProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BASE_URL: &str = "https://api.search.brave.com/res/v1";

// Brave has dedicated endpoints for web, news, videos, and images; the
// remaining categories are served by web search with the same query.
fn endpoint_path(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::News => "news/search",
        QueryKind::Videos => "videos/search",
        QueryKind::Images => "images/search",
        _ => "web/search",
    }
}

fn freshness(period: TimePeriod) -> Option<&'static str> {
    match period {
        TimePeriod::AnyTime => None,
        TimePeriod::PastHour | TimePeriod::PastDay => Some("pd"),
        TimePeriod::PastWeek => Some("pw"),
        TimePeriod::PastMonth => Some("pm"),
        TimePeriod::PastYear => Some("py"),
    }
}

pub struct BraveProvider {
    api_key: String,
    fetcher: HttpFetcher,
    base_url: String,
    timeout: Duration,
}

impl BraveProvider {
    pub fn new(api_key: String, fetcher: HttpFetcher) -> Self {
        Self {
            api_key,
            fetcher,
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, query: &PlannedQuery, limit: u32) -> Result<Url, SearchError> {
        let lang = language_info(&query.language);
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            endpoint_path(query.kind)
        ))
        .map_err(|e| SearchError::Parse(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.query)
                .append_pair("count", &limit.clamp(1, 50).to_string())
                .append_pair("country", lang.gl)
                .append_pair("search_lang", lang.code);
            if let Some(f) = freshness(query.period) {
                pairs.append_pair("freshness", f);
            }
        }
        Ok(url)
    }

    fn parse_response(&self, query: &PlannedQuery, body: &Value) -> Vec<SearchHit> {
        // Web responses nest results under `web`; the category endpoints
        // return a flat `results` array.
        let items = body
            .get("web")
            .and_then(|w| w.get("results"))
            .or_else(|| body.get("results"))
            .and_then(|v| v.as_array());
        let Some(items) = items else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| SearchHit {
                title: str_field(item, "title"),
                url: str_field(item, "url"),
                snippet: str_field(item, "description"),
                image_url: item
                    .get("thumbnail")
                    .map(|t| str_field(t, "src"))
                    .unwrap_or_default(),
                date: {
                    let age = str_field(item, "age");
                    if age.is_empty() {
                        str_field(item, "page_age")
                    } else {
                        age
                    }
                },
                language: query.language.clone(),
                kind: query.kind.as_str().to_string(),
                pdf_url: String::new(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    async fn search(
        &self,
        query: &PlannedQuery,
        limit: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.request_url(query, limit)?;
        let response = self
            .fetcher
            .get_with_headers(
                url.as_str(),
                &[
                    ("X-Subscription-Token", self.api_key.as_str()),
                    ("Accept", "application/json"),
                ],
                self.timeout,
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        Ok(self.parse_response(query, &body))
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::Brave
    }
}

impl std::fmt::Debug for BraveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveProvider")
            .field("api_key", &"***")
            .finish()
    }
}
