//! Tavily search provider for context-specific research queries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use newsgraph_shared::{NewsGraphError, Result};

use crate::SearchProvider;

/// Default Tavily search endpoint.
const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// Search provider backed by the Tavily research API.
pub struct TavilySearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
}

impl TavilySearch {
    pub fn new(api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key,
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
impl SearchProvider for TavilySearch {
    async fn search(&self, term: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .query(&[("query", term)])
            .send()
            .await
            .map_err(|e| NewsGraphError::Search(format!("tavily: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsGraphError::Search(format!(
                "tavily: HTTP {status} for term '{term}'"
            )));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| NewsGraphError::Search(format!("tavily: invalid response: {e}")))?;

        let urls: Vec<String> = body.results.into_iter().map(|r| r.url).collect();
        debug!(term, count = urls.len(), "tavily search complete");
        Ok(urls)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_returns_result_urls() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/search"))
            .and(wiremock::matchers::header("authorization", "Bearer tv-key"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "results": [
                        {"url": "https://journal.example.org/analysis", "score": 0.91},
                        {"url": "https://paper.example.org/report", "score": 0.84}
                    ]
                }),
            ))
            .mount(&server)
            .await;

        let provider = TavilySearch::new("tv-key".into(), 5)
            .unwrap()
            .with_endpoint(format!("{}/search", server.uri()));

        let urls = provider.search("zoning reform history").await.unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], "https://journal.example.org/analysis");
    }

    #[tokio::test]
    async fn search_server_error_is_reported() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = TavilySearch::new("tv-key".into(), 5)
            .unwrap()
            .with_endpoint(format!("{}/search", server.uri()));

        assert!(provider.search("anything").await.is_err());
    }
}
