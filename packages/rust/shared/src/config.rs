//! Application configuration for NewsGraph.
//!
//! User config lives at `~/.newsgraph/newsgraph.toml`.
//! CLI flags override config file values, which override defaults.
//! API keys are referenced by environment-variable name and never stored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NewsGraphError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "newsgraph.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".newsgraph";

// ---------------------------------------------------------------------------
// Config structs (matching newsgraph.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search provider settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Scraper settings.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Neo4j connection settings.
    #[serde(default)]
    pub neo4j: Neo4jConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum concurrent capability calls within a stage.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum URLs kept after merge/dedup in URL generation.
    #[serde(default = "default_url_cap")]
    pub url_cap: usize,

    /// Per-call timeout in seconds for provider network calls.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            url_cap: default_url_cap(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}
fn default_url_cap() -> usize {
    15
}
fn default_call_timeout() -> u64 {
    30
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Env var holding the Google CSE API key (never store the key itself).
    #[serde(default = "default_google_key_env")]
    pub google_api_key_env: String,

    /// Google CSE engine identifier (not a secret).
    #[serde(default)]
    pub google_cx: String,

    /// Env var holding the Tavily API key.
    #[serde(default = "default_tavily_key_env")]
    pub tavily_api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google_api_key_env: default_google_key_env(),
            google_cx: String::new(),
            tavily_api_key_env: default_tavily_key_env(),
        }
    }
}

fn default_google_key_env() -> String {
    "GOOGLE_CSE_API_KEY".into()
}
fn default_tavily_key_env() -> String {
    "TAVILY_API_KEY".into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model name for extraction and review calls.
    #[serde(default = "default_model")]
    pub model: String,

    /// Env var holding the LLM API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,

    /// Maximum completion tokens per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_llm_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_llm_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_temperature() -> f32 {
    0.2
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Base URL of the reader API (page text extraction service).
    #[serde(default = "default_reader_base")]
    pub reader_base_url: String,

    /// Env var holding the reader API key.
    #[serde(default = "default_reader_key_env")]
    pub reader_api_key_env: String,

    /// User-Agent header for direct HTML fetches.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Domain patterns routed to the local HTML scraper instead of the
    /// reader API (e.g. `*.substack.com`).
    #[serde(default)]
    pub html_domains: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            reader_base_url: default_reader_base(),
            reader_api_key_env: default_reader_key_env(),
            user_agent: default_user_agent(),
            html_domains: Vec::new(),
        }
    }
}

fn default_reader_base() -> String {
    "https://r.jina.ai".into()
}
fn default_reader_key_env() -> String {
    "JINA_API_KEY".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; NewsGraphBot/1.0)".into()
}

/// `[neo4j]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Neo4j HTTP endpoint (transactional API).
    #[serde(default = "default_neo4j_url")]
    pub http_url: String,

    /// Target database name.
    #[serde(default = "default_neo4j_db")]
    pub database: String,

    /// Database user.
    #[serde(default = "default_neo4j_user")]
    pub user: String,

    /// Env var holding the database password.
    #[serde(default = "default_neo4j_password_env")]
    pub password_env: String,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            http_url: default_neo4j_url(),
            database: default_neo4j_db(),
            user: default_neo4j_user(),
            password_env: default_neo4j_password_env(),
        }
    }
}

fn default_neo4j_url() -> String {
    "http://localhost:7474".into()
}
fn default_neo4j_db() -> String {
    "neo4j".into()
}
fn default_neo4j_user() -> String {
    "neo4j".into()
}
fn default_neo4j_password_env() -> String {
    "NEO4J_PASSWORD".into()
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum concurrent capability calls within a stage.
    pub concurrency: usize,
    /// Maximum URLs kept after merge/dedup in URL generation.
    pub url_cap: usize,
    /// Per-call timeout in seconds for provider network calls.
    pub call_timeout_secs: u64,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.defaults.concurrency,
            url_cap: config.defaults.url_cap,
            call_timeout_secs: config.defaults.call_timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.newsgraph/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NewsGraphError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.newsgraph/newsgraph.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NewsGraphError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NewsGraphError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NewsGraphError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NewsGraphError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NewsGraphError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the credentials the pipeline needs are present in the environment.
///
/// The LLM key is always required; search and Neo4j credentials are checked so
/// a run fails at startup rather than mid-pipeline.
pub fn validate_credentials(config: &AppConfig) -> Result<()> {
    let required = [
        &config.llm.api_key_env,
        &config.search.google_api_key_env,
        &config.neo4j.password_env,
    ];

    for var_name in required {
        match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => {}
            _ => {
                return Err(NewsGraphError::config(format!(
                    "credential not found: set the {var_name} environment variable"
                )));
            }
        }
    }

    Ok(())
}
