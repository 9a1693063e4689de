//! Upload: merge every approved record into the knowledge graph.

use newsgraph_shared::{LogLevel, PipelineConfig};

use crate::fanout::run_bounded;
use crate::router::PipelineDeps;
use crate::state::PipelineState;

pub(crate) async fn run(
    deps: &PipelineDeps,
    config: &PipelineConfig,
    state: &mut PipelineState,
) {
    if state.reviewed.is_empty() {
        state.log
            .append(LogLevel::Warning, "upload skipped: no approved records");
        state.upload_done = true;
        return;
    }

    let items: Vec<(String, newsgraph_shared::ArticleRecord)> = state
        .reviewed
        .iter()
        .map(|(url, record)| (url.clone(), record.clone()))
        .collect();

    let uploader = deps.uploader.clone();
    let results = run_bounded(config.concurrency, items, move |(_, record)| {
        let uploader = uploader.clone();
        async move { uploader.upload(&record).await }
    })
    .await;

    let total = results.len();
    let mut succeeded = 0;
    for ((url, _), result) in results {
        match result {
            Ok(message) => {
                succeeded += 1;
                state
                    .log
                    .append(LogLevel::Info, format!("uploaded {url}: {message}"));
            }
            Err(e) => {
                state
                    .log
                    .append(LogLevel::Error, format!("upload failed for {url}: {e}"));
            }
        }
    }

    // Completion, not per-item success, is this stage's contract: the flag
    // goes up once every item has been attempted. Per-item outcomes live in
    // the log only.
    state.upload_done = true;
    state.log.append(
        LogLevel::Info,
        format!("knowledge graph upload complete ({succeeded} of {total} records uploaded)"),
    );
}
