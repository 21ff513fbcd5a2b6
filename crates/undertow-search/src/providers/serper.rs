//! Serper.dev backend (Google results over a JSON API).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use undertow_fetch::HttpFetcher;
use undertow_types::{language_info, PlannedQuery, QueryKind, SearchHit, TimePeriod};

use super::str_field;
use crate::{SearchBackend, SearchError, SearchProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn endpoint(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Search => "https://google.serper.dev/search",
        QueryKind::News => "https://google.serper.dev/news",
        QueryKind::Scholar => "https://google.serper.dev/scholar",
        QueryKind::Videos => "https://google.serper.dev/videos",
        QueryKind::Images => "https://google.serper.dev/images",
        QueryKind::Places => "https://google.serper.dev/places",
        QueryKind::Shopping => "https://google.serper.dev/shopping",
    }
}

fn results_key(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Search | QueryKind::Scholar => "organic",
        QueryKind::News => "news",
        QueryKind::Videos => "videos",
        QueryKind::Images => "images",
        QueryKind::Places => "places",
        QueryKind::Shopping => "shopping",
    }
}

fn time_filter(period: TimePeriod) -> Option<&'static str> {
    match period {
        TimePeriod::AnyTime => None,
        TimePeriod::PastHour => Some("qdr:h"),
        TimePeriod::PastDay => Some("qdr:d"),
        TimePeriod::PastWeek => Some("qdr:w"),
        TimePeriod::PastMonth => Some("qdr:m"),
        TimePeriod::PastYear => Some("qdr:y"),
    }
}

pub struct SerperProvider {
    api_key: String,
    fetcher: HttpFetcher,
    base_url: Option<String>,
    timeout: Duration,
}

impl SerperProvider {
    pub fn new(api_key: String, fetcher: HttpFetcher) -> Self {
        Self {
            api_key,
            fetcher,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Redirect all category endpoints to a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn url_for(&self, kind: QueryKind) -> String {
        match &self.base_url {
            Some(base) => {
                let path = endpoint(kind)
                    .rsplit('/')
                    .next()
                    .unwrap_or("search");
                format!("{base}/{path}")
            }
            None => endpoint(kind).to_string(),
        }
    }

    fn parse_response(&self, query: &PlannedQuery, body: &Value) -> Vec<SearchHit> {
        let Some(items) = body.get(results_key(query.kind)).and_then(|v| v.as_array()) else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| SearchHit {
                title: str_field(item, "title"),
                url: str_field(item, "link"),
                snippet: str_field(item, "snippet"),
                image_url: str_field(item, "imageUrl"),
                date: str_field(item, "date"),
                language: query.language.clone(),
                kind: query.kind.as_str().to_string(),
                pdf_url: str_field(item, "pdfUrl"),
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(
        &self,
        query: &PlannedQuery,
        limit: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let lang = language_info(&query.language);
        let mut request = serde_json::json!({
            "q": query.query,
            "num": limit.clamp(1, 100),
            "gl": lang.gl,
            "hl": lang.hl,
        });
        if let Some(tbs) = time_filter(query.period) {
            request["tbs"] = Value::String(tbs.to_string());
        }

        let response = self
            .fetcher
            .post_json(
                &self.url_for(query.kind),
                &request,
                &[("X-API-KEY", self.api_key.as_str())],
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
        SearchBackend::Serper
    }
}

impl std::fmt::Debug for SerperProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperProvider")
            .field("api_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn translates_query_and_parses_organic_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "q": "rust web crawler",
                "gl": "kr",
                "hl": "ko",
                "tbs": "qdr:w",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic": [
                    {"title": "First", "link": "https://a.com", "snippet": "s1"},
                    {"title": "Second", "link": "https://b.com", "snippet": "s2", "date": "2 days ago"},
                ]
            })))
            .mount(&server)
            .await;

        let provider = SerperProvider::new("test-key".into(), HttpFetcher::with_defaults().unwrap())
            .with_base_url(server.uri());
        let query = PlannedQuery {
            query: "rust web crawler".into(),
            kind: QueryKind::Search,
            language: "ko".into(),
            period: TimePeriod::PastWeek,
        };
        let hits = provider.search(&query, 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://a.com");
        assert_eq!(hits[0].kind, "Search");
        assert_eq!(hits[0].language, "ko");
        assert_eq!(hits[1].date, "2 days ago");
    }

    #[tokio::test]
    async fn non_success_status_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let provider = SerperProvider::new("k".into(), HttpFetcher::with_defaults().unwrap())
            .with_base_url(server.uri());
        let err = provider
            .search(&PlannedQuery::search("q", "en"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Provider { status: 403, .. }));
    }

    #[test]
    fn news_queries_hit_the_news_endpoint() {
        let provider = SerperProvider::new("k".into(), HttpFetcher::with_defaults().unwrap());
        assert_eq!(provider.url_for(QueryKind::News), "https://google.serper.dev/news");
        assert_eq!(results_key(QueryKind::Scholar), "organic");
    }
}
