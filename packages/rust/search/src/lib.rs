//! Search providers for URL generation.
//!
//! A [`SearchProvider`] turns one search term into a list of article URLs.
//! Two implementations ship: [`GoogleCseSearch`] for broad/general queries and
//! [`TavilySearch`] for context-specific research queries. The pipeline picks
//! one per run via its strategy policy and fans terms out against it.

mod google_cse;
mod tavily;

use async_trait::async_trait;

use newsgraph_shared::Result;

pub use google_cse::GoogleCseSearch;
pub use tavily::TavilySearch;

/// A single-method search capability: term in, URLs out.
///
/// Implementations report transport/API failures as `Err`; a term that simply
/// matches nothing yields `Ok(vec![])`. Callers treat the two differently
/// (a failure is logged, an empty result is not).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `term`, returning result URLs in provider ranking order.
    async fn search(&self, term: &str) -> Result<Vec<String>>;

    /// Provider name for tracing and run logs.
    fn name(&self) -> &str;
}
