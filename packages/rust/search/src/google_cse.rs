//! Google Custom Search Engine provider for broad/general queries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use newsgraph_shared::{NewsGraphError, Result};

use crate::SearchProvider;

/// Default Google CSE REST endpoint.
const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Search provider backed by a Google Custom Search Engine.
pub struct GoogleCseSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    cx: String,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    link: String,
}

impl GoogleCseSearch {
    /// Create a provider for the engine identified by `cx`.
    pub fn new(api_key: String, cx: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: CSE_ENDPOINT.to_string(),
            api_key,
            cx,
        })
    }

    /// Point the provider at a different endpoint (for tests with mock servers).
    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for GoogleCseSearch {
    async fn search(&self, term: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cx.as_str()),
                ("q", term),
            ])
            .send()
            .await
            .map_err(|e| NewsGraphError::Search(format!("google cse: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsGraphError::Search(format!(
                "google cse: HTTP {status} for term '{term}'"
            )));
        }

        let body: CseResponse = response
            .json()
            .await
            .map_err(|e| NewsGraphError::Search(format!("google cse: invalid response: {e}")))?;

        let urls: Vec<String> = body.items.into_iter().map(|item| item.link).collect();
        debug!(term, count = urls.len(), "google cse search complete");
        Ok(urls)
    }

    fn name(&self) -> &str {
        "google_cse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(server: &wiremock::MockServer) -> GoogleCseSearch {
        GoogleCseSearch::new("test-key".into(), "test-cx".into(), 5)
            .unwrap()
            .with_endpoint(format!("{}/customsearch/v1", server.uri()))
    }

    #[tokio::test]
    async fn search_returns_result_links() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/customsearch/v1"))
            .and(wiremock::matchers::query_param("q", "city budget"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "items": [
                        {"link": "https://news.example.com/budget-1", "title": "Budget 1"},
                        {"link": "https://news.example.com/budget-2", "title": "Budget 2"}
                    ]
                }),
            ))
            .mount(&server)
            .await;

        let urls = provider(&server).search("city budget").await.unwrap();
        assert_eq!(
            urls,
            vec![
                "https://news.example.com/budget-1".to_string(),
                "https://news.example.com/budget-2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn search_with_no_items_is_empty_not_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({})),
            )
            .mount(&server)
            .await;

        let urls = provider(&server).search("no hits").await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn search_http_error_is_reported() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server).search("rate limited").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
