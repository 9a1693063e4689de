//! Scraping: fetch article text for every URL via its selected scraper.

use newsgraph_shared::{LogLevel, PipelineConfig};

use crate::fanout::run_bounded;
use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(
    deps: &PipelineDeps,
    config: &PipelineConfig,
    state: &mut PipelineState,
) {
    if state.urls_to_process.is_empty() {
        state.log
            .append(LogLevel::Warning, "scraping skipped: no URLs to process");
        return;
    }

    let items: Vec<(String, newsgraph_shared::ScraperKind)> = state
        .scraper_choice
        .iter()
        .map(|(url, kind)| (url.clone(), *kind))
        .collect();

    let scrapers = deps.scrapers.clone();
    let results = run_bounded(config.concurrency, items, move |(url, kind)| {
        let scrapers = scrapers.clone();
        async move { scrapers.get(kind).fetch(&url).await }
    })
    .await;

    let total = results.len();
    for ((url, kind), result) in results {
        match result {
            Ok(Some(text)) => {
                state.articles.insert(url, text);
            }
            Ok(None) => {
                state.log.append(
                    LogLevel::Warning,
                    format!("no content returned for {url} ({kind} scraper)"),
                );
            }
            Err(e) => {
                state
                    .log
                    .append(LogLevel::Error, format!("failed to scrape {url}: {e}"));
            }
        }
    }

    state.log.append(
        LogLevel::Info,
        format!("scraped {} of {total} articles", state.articles.len()),
    );
}
