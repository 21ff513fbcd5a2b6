//! SerpAPI backend (Google results over a GET API).

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use undertow_fetch::HttpFetcher;
use undertow_types::{language_info, PlannedQuery, QueryKind, SearchHit, TimePeriod};
use url::Url;

use super::str_field;
use crate::{SearchBackend, SearchError, SearchProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const BASE_URL: &str = "https://serpapi.com/search";

fn results_key(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Search | QueryKind::Scholar => "organic_results",
        QueryKind::News => "news_results",
        QueryKind::Videos => "video_results",
        QueryKind::Images => "images_results",
        QueryKind::Places => "local_results",
        QueryKind::Shopping => "shopping_results",
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

pub struct SerpApiProvider {
    api_key: String,
    fetcher: HttpFetcher,
    base_url: String,
    timeout: Duration,
}

impl SerpApiProvider {
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
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SearchError::Parse(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.query)
                .append_pair("num", &limit.clamp(1, 100).to_string())
                .append_pair("gl", lang.gl)
                .append_pair("hl", lang.hl)
                .append_pair("api_key", &self.api_key);
            match query.kind {
                QueryKind::Scholar => {
                    pairs.append_pair("engine", "google_scholar");
                }
                QueryKind::News => {
                    pairs.append_pair("engine", "google").append_pair("tbm", "nws");
                }
                QueryKind::Videos => {
                    pairs.append_pair("engine", "google").append_pair("tbm", "vid");
                }
                QueryKind::Images => {
                    pairs.append_pair("engine", "google").append_pair("tbm", "isch");
                }
                QueryKind::Shopping => {
                    pairs.append_pair("engine", "google").append_pair("tbm", "shop");
                }
                QueryKind::Places => {
                    pairs.append_pair("engine", "google").append_pair("tbm", "lcl");
                }
                QueryKind::Search => {
                    pairs.append_pair("engine", "google");
                }
            }
            if let Some(tbs) = time_filter(query.period) {
                pairs.append_pair("tbs", tbs);
            }
        }
        Ok(url)
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
                image_url: str_field(item, "thumbnail"),
                date: str_field(item, "date"),
                language: query.language.clone(),
                kind: query.kind.as_str().to_string(),
                pdf_url: String::new(),
            })
            .collect()
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(
        &self,
        query: &PlannedQuery,
        limit: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let url = self.request_url(query, limit)?;
        let response = self
            .fetcher
            .get_with_headers(url.as_str(), &[], self.timeout)
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
        SearchBackend::SerpApi
    }
}

impl std::fmt::Debug for SerpApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiProvider")
            .field("api_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use undertow_types::TimePeriod;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn scholar_uses_the_scholar_engine() {
        let provider =
            SerpApiProvider::new("k".into(), HttpFetcher::with_defaults().unwrap());
        let query = PlannedQuery {
            query: "transformer models".into(),
            kind: QueryKind::Scholar,
            language: "en".into(),
            period: TimePeriod::PastYear,
        };
        let url = provider.request_url(&query, 10).unwrap();
        let qs = url.query().unwrap();
        assert!(qs.contains("engine=google_scholar"));
        assert!(qs.contains("tbs=qdr%3Ay"));
    }

    #[tokio::test]
    async fn parses_organic_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("engine", "google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic_results": [
                    {"title": "Hit", "link": "https://a.com", "snippet": "s"}
                ]
            })))
            .mount(&server)
            .await;

        let provider = SerpApiProvider::new("k".into(), HttpFetcher::with_defaults().unwrap())
            .with_base_url(format!("{}/", server.uri()));
        let hits = provider
            .search(&PlannedQuery::search("q", "en"), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://a.com");
    }
}
