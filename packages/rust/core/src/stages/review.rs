//! Review: gate extracted records behind the reviewer oracle's verdict.

use newsgraph_shared::{LogLevel, PipelineConfig};

use crate::fanout::run_bounded;
use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(
    deps: &PipelineDeps,
    config: &PipelineConfig,
    state: &mut PipelineState,
) {
    if state.extracted.is_empty() {
        state.log
            .append(LogLevel::Warning, "review skipped: no extracted records");
        return;
    }

    let items: Vec<(String, newsgraph_shared::ArticleRecord)> = state
        .extracted
        .iter()
        .map(|(url, record)| (url.clone(), record.clone()))
        .collect();

    let reviewer = deps.reviewer.clone();
    let results = run_bounded(config.concurrency, items, move |(_, record)| {
        let reviewer = reviewer.clone();
        async move { reviewer.review(&record).await }
    })
    .await;

    let total = results.len();
    for ((url, record), result) in results {
        match result {
            // Only an unambiguous valid verdict passes; the record copies
            // through unchanged.
            Ok(verdict) if verdict.valid => {
                state.reviewed.insert(url, record);
            }
            Ok(verdict) => {
                state.log.append(
                    LogLevel::Warning,
                    format!(
                        "record for {url} failed review: {}",
                        verdict.reasons.join("; ")
                    ),
                );
            }
            Err(e) => {
                state
                    .log
                    .append(LogLevel::Error, format!("review failed for {url}: {e}"));
            }
        }
    }

    state.log.append(
        LogLevel::Info,
        format!("approved {} of {total} records", state.reviewed.len()),
    );
}
