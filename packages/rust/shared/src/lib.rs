//! Shared types, error model, and configuration for NewsGraph.
//!
//! This crate is the foundation depended on by all other NewsGraph crates.
//! It provides:
//! - [`NewsGraphError`] — the unified error type
//! - Domain types ([`ArticleRecord`], [`ReviewVerdict`], [`RunId`], [`LogEntry`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LlmConfig, Neo4jConfig, PipelineConfig, ScrapeConfig,
    SearchConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_credentials,
};
pub use error::{NewsGraphError, Result};
pub use types::{
    ArticleMeta, ArticleRecord, Controversy, ControversyKind, DocumentRef, Event, Fact,
    Institution, Issue, LogEntry, LogLevel, Quote, ReviewVerdict, RunId, ScraperKind,
    SearchStrategy, Stakeholder, StakeholderKind, StakeholderRelations,
};
