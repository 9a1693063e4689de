//! Extraction: article text → structured record via the LLM extractor.

use newsgraph_shared::{LogLevel, PipelineConfig};

use crate::fanout::run_bounded;
use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(
    deps: &PipelineDeps,
    config: &PipelineConfig,
    state: &mut PipelineState,
) {
    if state.articles.is_empty() {
        state.log
            .append(LogLevel::Warning, "extraction skipped: no articles scraped");
        return;
    }

    let items: Vec<(String, String)> = state
        .articles
        .iter()
        .map(|(url, text)| (url.clone(), text.clone()))
        .collect();

    let extractor = deps.extractor.clone();
    let results = run_bounded(config.concurrency, items, move |(url, text)| {
        let extractor = extractor.clone();
        async move { extractor.extract(&url, &text).await }
    })
    .await;

    let total = results.len();
    for ((url, _), result) in results {
        match result {
            Ok(Some(record)) => {
                state.extracted.insert(url, record);
            }
            Ok(None) => {
                state.log.append(
                    LogLevel::Warning,
                    format!("extraction produced no parseable record for {url}"),
                );
            }
            Err(e) => {
                state
                    .log
                    .append(LogLevel::Error, format!("extraction failed for {url}: {e}"));
            }
        }
    }

    state.log.append(
        LogLevel::Info,
        format!(
            "extracted structured records from {} of {total} articles",
            state.extracted.len()
        ),
    );
}
