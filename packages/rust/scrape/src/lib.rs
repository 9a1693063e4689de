//! Scraper providers and per-URL scraper selection.
//!
//! A [`ScraperProvider`] fetches the readable text of one article URL. Two
//! implementations ship: [`ReaderScraper`] (hosted reader API, the default)
//! and [`HtmlScraper`] (direct fetch + local content extraction). The
//! [`ScraperRegistry`] maps a [`ScraperKind`] tag to its provider once, so no
//! string matching happens inside the pipeline stages. Which kind a URL gets
//! is decided by an injectable [`ScraperPolicy`].

mod html;
mod policy;
mod reader;

use async_trait::async_trait;

use newsgraph_shared::{Result, ScraperKind};

pub use html::HtmlScraper;
pub use policy::{DomainPatternPolicy, ScraperPolicy};
pub use reader::ReaderScraper;

/// A single-method scrape capability: URL in, article text or absent out.
///
/// `Ok(None)` means the provider responded but produced no usable content
/// (blocked page, empty extraction). `Err` is a transport/provider failure.
/// Both are item-level conditions for the caller; neither aborts a stage.
#[async_trait]
pub trait ScraperProvider: Send + Sync {
    /// Fetch the readable text of `url`.
    async fn fetch(&self, url: &str) -> Result<Option<String>>;

    /// Provider name for tracing and run logs.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds one provider per [`ScraperKind`], resolved once at construction.
pub struct ScraperRegistry {
    reader: Box<dyn ScraperProvider>,
    html: Box<dyn ScraperProvider>,
}

impl ScraperRegistry {
    pub fn new(reader: Box<dyn ScraperProvider>, html: Box<dyn ScraperProvider>) -> Self {
        Self { reader, html }
    }

    /// Look up the provider for a scraper kind. Total: every kind has one.
    pub fn get(&self, kind: ScraperKind) -> &dyn ScraperProvider {
        match kind {
            ScraperKind::Reader => self.reader.as_ref(),
            ScraperKind::Html => self.html.as_ref(),
        }
    }
}
