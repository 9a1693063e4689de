//! Direct-fetch HTML scraper with local content extraction.
//!
//! Fetches the page, finds the main content area with readability-style
//! selector heuristics, strips navigation chrome, and converts the remaining
//! HTML to plain text via `htmd`.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use newsgraph_shared::{NewsGraphError, Result};

use crate::ScraperProvider;

/// Scraper that fetches pages directly and extracts article text locally.
pub struct HtmlScraper {
    client: reqwest::Client,
}

impl HtmlScraper {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NewsGraphError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ScraperProvider for HtmlScraper {
    async fn fetch(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NewsGraphError::Scrape(format!("html: {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "page fetch returned non-success status");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| NewsGraphError::Scrape(format!("html: {url}: body read failed: {e}")))?;

        let content_html = extract_content_html(&body);
        let text = html_to_text(&content_html)?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        debug!(url, len = text.len(), "html fetch complete");
        Ok(Some(text))
    }

    fn name(&self) -> &str {
        "html"
    }
}

/// Find the main content area: try `<main>`, `<article>`, role=main, then body.
fn extract_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);
    let selectors = ["main", "article", r#"[role="main"]"#, ".content"];

    for sel_str in selectors {
        let sel = Selector::parse(sel_str).unwrap();
        if let Some(el) = doc.select(&sel).next() {
            return strip_chrome(&el.inner_html());
        }
    }

    let body_sel = Selector::parse("body").unwrap();
    doc.select(&body_sel)
        .next()
        .map(|body| strip_chrome(&body.inner_html()))
        .unwrap_or_default()
}

/// Strip common navigation/chrome elements from HTML content.
fn strip_chrome(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let chrome_sel =
        Selector::parse("nav, header, footer, aside, script, style, .sidebar, .nav").unwrap();

    let mut result = html.to_string();
    for el in doc.select(&chrome_sel) {
        let outer = el.html();
        result = result.replace(&outer, "");
    }
    result
}

/// Convert content HTML to plain text via htmd.
fn html_to_text(content_html: &str) -> Result<String> {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style", "nav", "iframe", "noscript", "svg"])
        .build();

    converter
        .convert(content_html)
        .map_err(|e| NewsGraphError::parse(format!("htmd conversion failed: {e}")))
}
