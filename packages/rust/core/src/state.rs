//! Pipeline state: the single mutable record threaded through every stage.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use newsgraph_shared::{ArticleRecord, LogEntry, LogLevel, ScraperKind};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The router's state machine. `End` and `ErrorEnd` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    UrlGeneration,
    ScraperSelection,
    ArticleExtraction,
    Review,
    KnowledgeGraphUpload,
    End,
    ErrorEnd,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlGeneration => "url_generation",
            Self::ScraperSelection => "scraper_selection",
            Self::ArticleExtraction => "article_extraction",
            Self::Review => "review",
            Self::KnowledgeGraphUpload => "knowledge_graph_upload",
            Self::End => "end",
            Self::ErrorEnd => "error_end",
        }
    }

    /// Terminal stages admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::ErrorEnd)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RunLog
// ---------------------------------------------------------------------------

/// Append-only run log, cheaply cloneable so front ends can read it while
/// the run task owns the rest of the state.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and mirror it to the tracing subscriber.
    pub fn append(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        self.entries
            .lock()
            .expect("run log lock poisoned")
            .push(LogEntry::new(level, message));
    }

    /// Copy of all entries in append order.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("run log lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("run log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// The sole shared record for one pipeline run.
///
/// Owned exclusively by the run that created it; each stage writes exactly
/// one field, and every mapping's key set is a subset of the previous
/// stage's keys — data is only ever dropped as it flows forward.
#[derive(Debug)]
pub struct PipelineState {
    /// The query the run was started with. Immutable after creation.
    pub user_query: String,
    /// Search terms derived from the query (or provided up front).
    pub search_terms: Vec<String>,
    /// Deduplicated article URLs. Written only by URL generation.
    pub urls_to_process: BTreeSet<String>,
    /// URL → scraper kind. Written only by scraper selection.
    pub scraper_choice: BTreeMap<String, ScraperKind>,
    /// URL → raw article text. Written only by scraping.
    pub articles: BTreeMap<String, String>,
    /// URL → extracted record. Written only by extraction.
    pub extracted: BTreeMap<String, ArticleRecord>,
    /// URL → approved record. Written only by review.
    pub reviewed: BTreeMap<String, ArticleRecord>,
    /// Set after the upload stage has attempted every reviewed item.
    pub upload_done: bool,
    /// Current state-machine position. Written only by the router.
    pub current_stage: Stage,
    /// Append-only run log.
    pub log: RunLog,
}

impl PipelineState {
    /// Fresh state for one run, all collections empty.
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            search_terms: Vec::new(),
            urls_to_process: BTreeSet::new(),
            scraper_choice: BTreeMap::new(),
            articles: BTreeMap::new(),
            extracted: BTreeMap::new(),
            reviewed: BTreeMap::new(),
            upload_done: false,
            current_stage: Stage::UrlGeneration,
            log: RunLog::new(),
        }
    }

    /// Coarse status snapshot for polling front ends.
    pub fn status(&self) -> RunStatus {
        RunStatus {
            stage: self.current_stage,
            terminal: self.current_stage.is_terminal(),
            upload_done: self.upload_done,
        }
    }
}

/// What status polling exposes: coarse state only, never raw errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    pub stage: Stage,
    pub terminal: bool,
    pub upload_done: bool,
}
