//! Run lifecycle: spawn a pipeline run and observe it from outside.
//!
//! A [`RunHandle`] is what front ends hold: it starts the run on a spawned
//! task (which exclusively owns the [`PipelineState`]) and exposes only
//! snapshots — a watch channel for coarse status and the shared append-only
//! log. [`build_router`] wires the real providers from [`AppConfig`].

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use newsgraph_graph::{Neo4jConfig, Neo4jUploader};
use newsgraph_llm::{
    ChatClient, ChatClientConfig, LlmExtractor, LlmReviewer, LlmStrategyPolicy,
    LlmTermGenerator, SchemaValidator,
};
use newsgraph_scrape::{DomainPatternPolicy, HtmlScraper, ReaderScraper, ScraperRegistry};
use newsgraph_search::{GoogleCseSearch, TavilySearch};
use newsgraph_shared::{
    AppConfig, LogEntry, NewsGraphError, PipelineConfig, Result, RunId,
};

use crate::router::{PipelineDeps, Router, RunObserver};
use crate::state::{PipelineState, RunLog, RunStatus};

// ---------------------------------------------------------------------------
// RunHandle
// ---------------------------------------------------------------------------

/// Handle to a running (or finished) pipeline run.
pub struct RunHandle {
    id: RunId,
    query: String,
    log: RunLog,
    status_rx: watch::Receiver<RunStatus>,
    join: JoinHandle<PipelineState>,
}

impl RunHandle {
    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Latest coarse status snapshot.
    pub fn status(&self) -> RunStatus {
        *self.status_rx.borrow()
    }

    /// Copy of the append-only log so far.
    pub fn log(&self) -> Vec<LogEntry> {
        self.log.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run to reach a terminal stage and take the final state.
    pub async fn wait(self) -> Result<PipelineState> {
        self.join
            .await
            .map_err(|e| NewsGraphError::Task(format!("run task failed: {e}")))
    }
}

/// Publishes stage transitions into a watch channel.
struct WatchObserver {
    tx: watch::Sender<RunStatus>,
}

impl RunObserver for WatchObserver {
    fn stage_changed(&self, status: &RunStatus) {
        let _ = self.tx.send(*status);
    }
}

/// Start a run for `query`. Pre-supplied `search_terms` skip term generation.
///
/// Each call creates an independently-owned state; concurrent runs never
/// share one.
pub fn start_run(
    router: Arc<Router>,
    query: impl Into<String>,
    search_terms: Vec<String>,
) -> RunHandle {
    let mut state = PipelineState::new(query);
    state.search_terms = search_terms;

    let id = RunId::new();
    let query = state.user_query.clone();
    let log = state.log.clone();
    let (tx, status_rx) = watch::channel(state.status());

    let join = tokio::spawn(async move {
        let observer = WatchObserver { tx };
        router.run(&mut state, &observer).await;
        state
    });

    RunHandle {
        id,
        query,
        log,
        status_rx,
        join,
    }
}

// ---------------------------------------------------------------------------
// Provider wiring
// ---------------------------------------------------------------------------

/// Build a [`Router`] with the real providers configured in `config`.
///
/// `deterministic_review` swaps the LLM reviewer for the offline schema
/// validator.
pub fn build_router(config: &AppConfig, deterministic_review: bool) -> Result<Router> {
    let pipeline = PipelineConfig::from(config);
    let timeout = pipeline.call_timeout_secs;

    let chat = ChatClient::new(ChatClientConfig {
        api_base: config.llm.api_base.clone(),
        model: config.llm.model.clone(),
        api_key: require_env(&config.llm.api_key_env)?,
        max_tokens: config.llm.max_tokens,
        temperature: config.llm.temperature,
        timeout_secs: timeout,
    })?;

    let general_search = GoogleCseSearch::new(
        require_env(&config.search.google_api_key_env)?,
        config.search.google_cx.clone(),
        timeout,
    )?;
    // The contextual engine is optional; runs that never select it work
    // without the key, and per-term failures are logged otherwise.
    let contextual_search = TavilySearch::new(
        optional_env(&config.search.tavily_api_key_env),
        timeout,
    )?;

    let reader = ReaderScraper::new(
        config.scrape.reader_base_url.clone(),
        optional_env(&config.scrape.reader_api_key_env),
        timeout,
    )?;
    let html = HtmlScraper::new(&config.scrape.user_agent, timeout)?;

    let uploader = Neo4jUploader::new(Neo4jConfig {
        http_url: config.neo4j.http_url.clone(),
        database: config.neo4j.database.clone(),
        user: config.neo4j.user.clone(),
        password: require_env(&config.neo4j.password_env)?,
        timeout_secs: timeout,
    })?;

    let reviewer: Arc<dyn newsgraph_llm::ReviewerOracle> = if deterministic_review {
        Arc::new(SchemaValidator)
    } else {
        Arc::new(LlmReviewer::new(chat.clone()))
    };

    let deps = PipelineDeps {
        term_generator: Arc::new(LlmTermGenerator::new(chat.clone())),
        strategy_policy: Arc::new(LlmStrategyPolicy::new(chat.clone())),
        general_search: Arc::new(general_search),
        contextual_search: Arc::new(contextual_search),
        scraper_policy: Arc::new(DomainPatternPolicy::new(&config.scrape.html_domains)),
        scrapers: Arc::new(ScraperRegistry::new(Box::new(reader), Box::new(html))),
        extractor: Arc::new(LlmExtractor::new(chat)),
        reviewer,
        uploader: Arc::new(uploader),
    };

    Ok(Router::new(deps, pipeline))
}

fn require_env(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(NewsGraphError::config(format!(
            "credential not found: set the {var_name} environment variable"
        ))),
    }
}

fn optional_env(var_name: &str) -> String {
    std::env::var(var_name).unwrap_or_default()
}
