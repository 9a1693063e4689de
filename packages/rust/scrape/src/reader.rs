//! Reader-API scraper: hosted text extraction for article URLs.
//!
//! The reader service takes `GET <base>/<target-url>` and returns the page's
//! readable text. This is the default path for most article URLs.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use newsgraph_shared::{NewsGraphError, Result};

use crate::ScraperProvider;

/// Scraper backed by a hosted reader API (Jina-style URL-prefix endpoint).
pub struct ReaderScraper {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ReaderScraper {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ScraperProvider for ReaderScraper {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let reader_url = format!("{}/{url}", self.base_url);

        let response = self
            .client
            .get(&reader_url)
            .bearer_auth(&self.api_key)
            .header("X-Return-Format", "text")
            .send()
            .await
            .map_err(|e| NewsGraphError::Scrape(format!("reader: {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            // The service answered but could not read the page. Absent, not fatal.
            warn!(url, %status, "reader API returned non-success status");
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| NewsGraphError::Scrape(format!("reader: {url}: body read failed: {e}")))?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        debug!(url, len = text.len(), "reader fetch complete");
        Ok(Some(text))
    }

    fn name(&self) -> &str {
        "reader"
    }
}
