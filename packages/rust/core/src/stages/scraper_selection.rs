//! Scraper selection: classify every URL into a scraper kind.

use url::Url;

use newsgraph_shared::{LogLevel, ScraperKind};

use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(deps: &PipelineDeps, state: &mut PipelineState) {
    if state.urls_to_process.is_empty() {
        state.log.append(
            LogLevel::Warning,
            "scraper selection skipped: no URLs to process",
        );
        return;
    }

    for url_str in &state.urls_to_process {
        let kind = match Url::parse(url_str) {
            Ok(url) => deps.scraper_policy.classify(&url),
            // Unparseable URLs still get an entry; the scrape itself will
            // fail and be logged as an item-level failure.
            Err(_) => ScraperKind::Reader,
        };
        state.scraper_choice.insert(url_str.clone(), kind);
    }

    let reader_count = state
        .scraper_choice
        .values()
        .filter(|k| **k == ScraperKind::Reader)
        .count();
    state.log.append(
        LogLevel::Info,
        format!(
            "selected scrapers for {} URLs ({reader_count} reader, {} html)",
            state.scraper_choice.len(),
            state.scraper_choice.len() - reader_count
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[tokio::test]
    async fn every_url_gets_exactly_one_entry() {
        let deps = testutil::deps(testutil::DepsSpec::default());
        let mut state = PipelineState::new("q");
        state.urls_to_process = ["http://a.example/1", "http://b.example/2", "not a url"]
            .into_iter()
            .map(String::from)
            .collect();

        run(&deps, &mut state).await;

        assert_eq!(state.scraper_choice.len(), 3);
        // The unparseable entry falls back to the reader kind.
        assert_eq!(state.scraper_choice["not a url"], ScraperKind::Reader);
    }

    #[tokio::test]
    async fn empty_input_is_a_warned_noop() {
        let deps = testutil::deps(testutil::DepsSpec::default());
        let mut state = PipelineState::new("q");

        run(&deps, &mut state).await;

        assert!(state.scraper_choice.is_empty());
        let log = state.log.snapshot();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].level, newsgraph_shared::LogLevel::Warning);
    }
}
