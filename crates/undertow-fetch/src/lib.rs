//! Shared HTTP client for the Undertow pipeline.
//!
//! One [`HttpFetcher`] is built per process and cloned freely; the inner
//! `reqwest` client owns the connection pool. The client speaks HTTP/2,
//! follows up to five redirects, presents a randomized desktop User-Agent
//! chosen at startup, and verifies TLS against the system trust store.

mod error;
mod user_agent;

pub use error::FetchError;

use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Per-call deadlines. `connect` maps to the TCP/TLS connect timeout;
/// `read` bounds the whole request once connected. `write` and `pool` are
/// folded into the request deadline — reqwest does not expose them
/// separately the way the pool-level limits are described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
    pub pool: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(500),
            read: Duration::from_millis(800),
            write: Duration::from_millis(300),
            pool: Duration::from_millis(200),
        }
    }
}

impl Timeouts {
    /// Deadline applied to a single request after connect.
    pub fn request_deadline(&self) -> Duration {
        self.read + self.write + self.pool
    }

    pub fn with_read(mut self, read: Duration) -> Self {
        self.read = read;
        self
    }
}

/// Pool and identity configuration for the process-wide client.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_idle_per_host: usize,
    pub idle_timeout: Duration,
    pub max_redirects: usize,
    pub timeouts: Timeouts,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            // 200 total connections with 40 kept alive for 90s; reqwest
            // manages the pool per host, so the keep-alive share is the
            // tunable that matters.
            max_idle_per_host: 40,
            idle_timeout: Duration::from_secs(90),
            max_redirects: 5,
            timeouts: Timeouts::default(),
        }
    }
}

/// Process-shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeouts: Timeouts,
}

impl HttpFetcher {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent::desktop_user_agent())
                .unwrap_or_else(|_| HeaderValue::from_static(user_agent::FALLBACK)),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));

        let client = Client::builder()
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            client,
            timeouts: config.timeouts,
        })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(FetcherConfig::default())
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// GET with the client's default deadlines.
    pub async fn get(&self, url: &str) -> Result<Response, FetchError> {
        self.get_with_timeouts(url, self.timeouts).await
    }

    /// GET with caller-supplied deadlines. One retry on connect-level
    /// failures; HTTP status errors are returned to the caller untouched.
    pub async fn get_with_timeouts(
        &self,
        url: &str,
        timeouts: Timeouts,
    ) -> Result<Response, FetchError> {
        let mut last_err = None;
        for attempt in 0..2u8 {
            match self
                .client
                .get(url)
                .timeout(timeouts.request_deadline())
                .send()
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt == 0 => {
                    debug!(url, error = %e, "connect failed, retrying once");
                    last_err = Some(FetchError::from(e));
                }
                Err(e) => return Err(FetchError::from(e)),
            }
        }
        Err(last_err.unwrap_or(FetchError::Timeout))
    }

    /// GET returning the body as text, treating non-2xx as an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text_with_timeouts(url, self.timeouts).await
    }

    pub async fn get_text_with_timeouts(
        &self,
        url: &str,
        timeouts: Timeouts,
    ) -> Result<String, FetchError> {
        let response = self.get_with_timeouts(url, timeouts).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }

    /// GET returning the raw body bytes, treating non-2xx as an error.
    pub async fn get_bytes_with_timeouts(
        &self,
        url: &str,
        timeouts: Timeouts,
    ) -> Result<bytes::Bytes, FetchError> {
        let response = self.get_with_timeouts(url, timeouts).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }

    /// POST a JSON body with extra headers; the caller inspects the status.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
        deadline: Duration,
    ) -> Result<Response, FetchError> {
        let mut request = self.client.post(url).json(body).timeout(deadline);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.map_err(FetchError::from)
    }

    /// GET with extra headers and an explicit deadline; the caller inspects
    /// the status.
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        deadline: Duration,
    ) -> Result<Response, FetchError> {
        let mut request = self.client.get(url).timeout(deadline);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await.map_err(FetchError::from)
    }

    /// GET prepared for chunked consumption via `Response::bytes_stream`.
    /// The deadline covers the whole body read, so callers that cap their
    /// download size should pick it accordingly.
    pub async fn get_streaming(
        &self,
        url: &str,
        deadline: Duration,
    ) -> Result<Response, FetchError> {
        self.client
            .get(url)
            .timeout(deadline)
            .send()
            .await
            .map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_timeouts_are_subsecond() {
        let t = Timeouts::default();
        assert_eq!(t.connect, Duration::from_millis(500));
        assert_eq!(t.read, Duration::from_millis(800));
        assert_eq!(t.request_deadline(), Duration::from_millis(1300));
    }

    #[tokio::test]
    async fn get_text_returns_body_for_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::with_defaults().unwrap();
        let body = fetcher
            .get_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn get_text_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::with_defaults().unwrap();
        let err = fetcher
            .get_text(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test]
    async fn post_json_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(wiremock::matchers::header("x-api-key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::with_defaults().unwrap();
        let response = fetcher
            .post_json(
                &format!("{}/api", server.uri()),
                &serde_json::json!({"q": "x"}),
                &[("X-API-KEY", "k")],
                Duration::from_secs(2),
            )
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
}
