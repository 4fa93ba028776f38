//! reqwest-backed feed client

use anyhow::{Context, Result};
use reqwest::{Client, Url, header};
use std::time::Duration;

use crate::config::Config;
use crate::error::FeedError;
use crate::models::Page;

use super::FeedApi;

/// HTTP client for the listing endpoint
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    /// Create a client with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reelfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Create a client from the configured timeout
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(Duration::from_secs(config.request_timeout_secs))
    }
}

impl FeedApi for HttpFeedClient {
    async fn fetch_page(&self, url: &Url, token: &str) -> Result<Page, FeedError> {
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Feed request failed with {status}: {}", body_excerpt(&body));
            return Err(FeedError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FeedError::Decode(e.to_string()))
    }
}

/// Longest slice of an error body that goes into the log
const MAX_LOGGED_BODY: usize = 200;

fn body_excerpt(body: &str) -> String {
    if body.chars().count() <= MAX_LOGGED_BODY {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_LOGGED_BODY).collect();
        format!("{cut}... ({} bytes)", body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpFeedClient {
        HttpFeedClient::new(Duration::from_secs(5)).unwrap()
    }

    fn url(server: &MockServer, rest: &str) -> Url {
        Url::parse(&format!("{}{rest}", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_sends_bearer_and_parses_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reels/"))
            .and(query_param("page_size", "2"))
            .and(header("authorization", "Bearer abc123"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "id": 1, "likes": 5 }, { "id": 2 }],
                "next": "http://example.test/api/reels/?page=2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client()
            .fetch_page(&url(&server, "/api/reels/?page_size=2"), "abc123")
            .await
            .unwrap();

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, ItemId::Int(1));
        assert_eq!(page.results[1].like_count(), 0);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let err = client()
            .fetch_page(&url(&server, "/api/reels/"), "stale")
            .await
            .unwrap_err();

        assert_eq!(err, FeedError::Http { status: 401 });
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client()
            .fetch_page(&url(&server, "/api/reels/"), "t")
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::Decode(_)));
    }

    #[test]
    fn test_body_excerpt_is_bounded() {
        assert_eq!(body_excerpt("invalid token"), "invalid token");

        let page = "é".repeat(5_000);
        let excerpt = body_excerpt(&page);
        assert!(excerpt.starts_with(&"é".repeat(MAX_LOGGED_BODY)));
        assert!(excerpt.ends_with("... (10000 bytes)"));
        assert!(excerpt.chars().count() < MAX_LOGGED_BODY + 32);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let dead = Url::parse("http://127.0.0.1:1/api/reels/").unwrap();

        let err = client().fetch_page(&dead, "t").await.unwrap_err();
        assert!(matches!(err, FeedError::Network(_)));
    }
}
