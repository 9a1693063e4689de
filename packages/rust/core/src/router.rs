//! Router: the explicit-transition state machine driving a pipeline run.
//!
//! `advance` runs the handler(s) for the current stage, then consults a
//! success predicate over the state to pick the next stage. A stage whose
//! output collection ends up empty is fatal for the run — the router moves
//! to `error_end` and never retries. The upload stage is the deliberate
//! exception: completing the attempt is its success condition.

use std::sync::Arc;

use tracing::instrument;

use newsgraph_graph::GraphUploader;
use newsgraph_llm::{ArticleExtractor, ReviewerOracle, SearchStrategyPolicy, TermGenerator};
use newsgraph_scrape::{ScraperPolicy, ScraperRegistry};
use newsgraph_search::SearchProvider;
use newsgraph_shared::{LogLevel, PipelineConfig};

use crate::stages;
use crate::state::{PipelineState, RunStatus, Stage};

/// The capability providers a pipeline run consumes.
///
/// Everything is behind a trait object so front ends and tests can swap
/// implementations without touching the engine.
pub struct PipelineDeps {
    pub term_generator: Arc<dyn TermGenerator>,
    pub strategy_policy: Arc<dyn SearchStrategyPolicy>,
    pub general_search: Arc<dyn SearchProvider>,
    pub contextual_search: Arc<dyn SearchProvider>,
    pub scraper_policy: Arc<dyn ScraperPolicy>,
    pub scrapers: Arc<ScraperRegistry>,
    pub extractor: Arc<dyn ArticleExtractor>,
    pub reviewer: Arc<dyn ReviewerOracle>,
    pub uploader: Arc<dyn GraphUploader>,
}

/// Observer for stage transitions during a run.
pub trait RunObserver: Send + Sync {
    /// Called after every router step with the new coarse status.
    fn stage_changed(&self, status: &RunStatus) {
        let _ = status;
    }
}

/// No-op observer for headless/test usage.
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Drives one [`PipelineState`] from `url_generation` to a terminal stage.
pub struct Router {
    deps: PipelineDeps,
    config: PipelineConfig,
}

impl Router {
    pub fn new(deps: PipelineDeps, config: PipelineConfig) -> Self {
        Self { deps, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the current stage and transition. A no-op on terminal states.
    pub async fn advance(&self, state: &mut PipelineState) {
        match state.current_stage {
            Stage::UrlGeneration => {
                stages::url_generation::run(&self.deps, &self.config, state).await;
                if state.urls_to_process.is_empty() {
                    self.fail(state, "no URLs produced");
                } else {
                    self.transition(state, Stage::ScraperSelection);
                }
            }
            // Selection chains straight into scraping; the two handlers stay
            // separate but share one state-machine step.
            Stage::ScraperSelection => {
                stages::scraper_selection::run(&self.deps, state).await;
                stages::scraping::run(&self.deps, &self.config, state).await;
                if state.articles.is_empty() {
                    self.fail(state, "no articles scraped");
                } else {
                    self.transition(state, Stage::ArticleExtraction);
                }
            }
            Stage::ArticleExtraction => {
                stages::extraction::run(&self.deps, &self.config, state).await;
                if state.extracted.is_empty() {
                    self.fail(state, "no structured records extracted");
                } else {
                    self.transition(state, Stage::Review);
                }
            }
            Stage::Review => {
                stages::review::run(&self.deps, &self.config, state).await;
                if state.reviewed.is_empty() {
                    self.fail(state, "no records passed review");
                } else {
                    self.transition(state, Stage::KnowledgeGraphUpload);
                }
            }
            Stage::KnowledgeGraphUpload => {
                stages::upload::run(&self.deps, &self.config, state).await;
                self.transition(state, Stage::End);
            }
            Stage::End | Stage::ErrorEnd => {}
        }
    }

    /// Loop `advance` until terminal, reporting each step to `observer`.
    #[instrument(skip_all, fields(query = %state.user_query))]
    pub async fn run(&self, state: &mut PipelineState, observer: &dyn RunObserver) {
        state.log.append(
            LogLevel::Info,
            format!("starting pipeline run for query: {}", state.user_query),
        );
        observer.stage_changed(&state.status());

        while !state.current_stage.is_terminal() {
            self.advance(state).await;
            observer.stage_changed(&state.status());
        }

        state.log.append(
            LogLevel::Info,
            format!("pipeline run finished in stage {}", state.current_stage),
        );
    }

    fn transition(&self, state: &mut PipelineState, next: Stage) {
        state
            .log
            .append(LogLevel::Info, format!("advancing to {next}"));
        state.current_stage = next;
    }

    fn fail(&self, state: &mut PipelineState, reason: &str) {
        state
            .log
            .append(LogLevel::Error, format!("run failed: {reason}"));
        state.current_stage = Stage::ErrorEnd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use newsgraph_shared::LogLevel;

    use crate::testutil::{self, DepsSpec};

    async fn run_to_end(deps: PipelineDeps) -> PipelineState {
        let router = Router::new(deps, testutil::config());
        let mut state = PipelineState::new("test");
        router.run(&mut state, &SilentObserver).await;
        state
    }

    #[tokio::test]
    async fn end_to_end_happy_path() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into(), "http://b".into()],
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        assert_eq!(state.current_stage, Stage::End);
        assert!(state.upload_done);
        assert_eq!(state.urls_to_process.len(), 2);
        assert_eq!(state.scraper_choice.len(), 2);
        assert_eq!(state.articles.len(), 2);
        assert_eq!(state.extracted.len(), 2);
        assert_eq!(state.reviewed.len(), 2);
    }

    #[tokio::test]
    async fn mappings_narrow_monotonically() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into(), "http://b".into(), "http://c".into()],
            scrape_failures: vec!["http://c".into()],
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        // Every mapping's keys are a subset of the previous stage's keys.
        assert!(state
            .articles
            .keys()
            .all(|k| state.urls_to_process.contains(k)));
        assert!(state.extracted.keys().all(|k| state.articles.contains_key(k)));
        assert!(state.reviewed.keys().all(|k| state.extracted.contains_key(k)));
    }

    #[tokio::test]
    async fn duplicate_search_results_are_deduped_and_capped() {
        // Every term returns the same 20 URLs; the set must be unique and ≤ 15.
        let urls: Vec<String> = (0..20).map(|i| format!("http://dup.example/{i}")).collect();
        let spec = DepsSpec {
            search_terms: vec!["t1".into(), "t2".into(), "t3".into()],
            search_results: urls,
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        assert_eq!(state.urls_to_process.len(), 15);
    }

    #[tokio::test]
    async fn partial_scrape_failure_is_contained() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into(), "http://b".into(), "http://c".into()],
            scrape_failures: vec!["http://b".into()],
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        // 2 articles, exactly one error line for the failed URL, and the
        // stage still counted as a success (the run reached End).
        assert_eq!(state.articles.len(), 2);
        assert_eq!(state.current_stage, Stage::End);

        let scrape_errors: Vec<_> = state
            .log
            .snapshot()
            .into_iter()
            .filter(|e| e.level == LogLevel::Error && e.message.contains("scrape"))
            .collect();
        assert_eq!(scrape_errors.len(), 1);
        assert!(scrape_errors[0].message.contains("http://b"));
    }

    #[tokio::test]
    async fn total_scrape_failure_halts_before_extraction() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into(), "http://b".into()],
            scrape_failures: vec!["http://a".into(), "http://b".into()],
            ..Default::default()
        };
        let harness = testutil::harness(spec);

        let state = run_to_end(harness.deps).await;

        assert_eq!(state.current_stage, Stage::ErrorEnd);
        assert!(state.articles.is_empty());
        // The router must not have invoked extraction at all.
        assert_eq!(harness.extraction_calls.load(Ordering::SeqCst), 0);
        assert!(!state.upload_done);
    }

    #[tokio::test]
    async fn zero_urls_transitions_straight_to_error_end() {
        let spec = DepsSpec {
            search_results: vec![],
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        assert_eq!(state.current_stage, Stage::ErrorEnd);
        assert!(state.scraper_choice.is_empty());
        let log = state.log.snapshot();
        assert!(log
            .iter()
            .any(|e| e.level == LogLevel::Error && e.message.contains("no URLs produced")));
    }

    #[tokio::test]
    async fn rejected_reviews_leave_error_end_when_nothing_passes() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into()],
            reject_reviews: true,
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        assert_eq!(state.current_stage, Stage::ErrorEnd);
        assert!(state.reviewed.is_empty());
        assert!(!state.upload_done);
    }

    #[tokio::test]
    async fn upload_failures_do_not_fail_the_run() {
        let spec = DepsSpec {
            search_results: vec!["http://a".into(), "http://b".into()],
            upload_fails: true,
            ..Default::default()
        };
        let state = run_to_end(testutil::deps(spec)).await;

        // Completion is the upload stage's success condition.
        assert_eq!(state.current_stage, Stage::End);
        assert!(state.upload_done);
    }

    #[tokio::test]
    async fn scrape_concurrency_stays_within_limit() {
        let urls: Vec<String> = (0..12).map(|i| format!("http://many.example/{i}")).collect();
        let spec = DepsSpec {
            search_results: urls,
            scrape_delay_ms: 10,
            ..Default::default()
        };
        let harness = testutil::harness(spec);
        let max_concurrent = harness.scrape_max_concurrent.clone();

        let state = run_to_end(harness.deps).await;

        assert_eq!(state.current_stage, Stage::End);
        // testutil::config() sets the limit to 3.
        assert!(max_concurrent.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn uploading_identical_records_twice_does_not_duplicate() {
        let harness = testutil::harness(DepsSpec::default());
        let uploader = harness.deps.uploader.clone();

        let record = testutil::record("http://a");
        uploader.upload(&record).await.unwrap();
        uploader.upload(&record).await.unwrap();

        assert_eq!(harness.uploaded_keys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn advance_on_terminal_state_is_a_noop() {
        let deps = testutil::deps(DepsSpec::default());
        let router = Router::new(deps, testutil::config());

        let mut state = PipelineState::new("q");
        state.current_stage = Stage::End;
        router.advance(&mut state).await;
        assert_eq!(state.current_stage, Stage::End);
        assert!(state.log.is_empty());
    }
}
