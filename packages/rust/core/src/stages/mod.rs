//! Stage handlers: each reads some state fields and writes exactly one.
//!
//! Handlers contain every provider failure at the per-item boundary — they
//! log, drop the item, and keep going. Whether the stage as a whole counts
//! as failed is the router's call, made from the state after the handler
//! returns. An empty input collection is a no-op success with a warning, so
//! "upstream produced nothing" and "this stage produced nothing" stay
//! distinguishable in the log.

pub(crate) mod extraction;
pub(crate) mod review;
pub(crate) mod scraper_selection;
pub(crate) mod scraping;
pub(crate) mod upload;
pub(crate) mod url_generation;
