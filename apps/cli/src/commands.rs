//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use newsgraph_core::{PipelineState, RunObserver, RunStatus, Stage, build_router};
use newsgraph_shared::{AppConfig, RunId, config_dir, init_config, load_config, validate_credentials};
use newsgraph_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// NewsGraph — turn news queries into a knowledge graph.
#[derive(Parser)]
#[command(
    name = "newsgraph",
    version,
    about = "Search, scrape, extract, review, and upload article knowledge into a graph.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full pipeline for a query.
    Run {
        /// The user query to research.
        query: String,

        /// Search terms to use instead of generating them from the query
        /// (can be specified multiple times).
        #[arg(short, long)]
        term: Vec<String>,

        /// Maximum concurrent capability calls within a stage.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Use the offline schema validator instead of the LLM reviewer.
        #[arg(long)]
        deterministic_review: bool,
    },

    /// List past runs.
    History {
        /// Maximum number of runs to show.
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Print the log of a past run.
    Logs {
        /// Run ID.
        run_id: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "newsgraph=info",
        1 => "newsgraph=debug",
        _ => "newsgraph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            query,
            term,
            concurrency,
            deterministic_review,
        } => cmd_run(&query, term, concurrency, deterministic_review).await,
        Command::History { limit } => cmd_history(limit).await,
        Command::Logs { run_id } => cmd_logs(&run_id).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(
    query: &str,
    terms: Vec<String>,
    concurrency: Option<usize>,
    deterministic_review: bool,
) -> Result<()> {
    // Validate credentials before doing anything
    let mut config = load_config()?;
    validate_credentials(&config)?;

    if let Some(limit) = concurrency {
        config.defaults.concurrency = limit;
    }

    let router = build_router(&config, deterministic_review)?;

    info!(query, terms = terms.len(), "starting pipeline run");

    let run_id = RunId::new();
    let mut state = PipelineState::new(query);
    state.search_terms = terms;

    let reporter = CliProgress::new();
    router.run(&mut state, &reporter).await;
    reporter.finish();

    // Persist the run for `history` / `logs`
    let storage = open_history_db().await?;
    storage
        .insert_run(&run_id.to_string(), query, state.current_stage.as_str())
        .await?;
    storage
        .finish_run(
            &run_id.to_string(),
            state.current_stage.as_str(),
            state.upload_done,
        )
        .await?;
    storage
        .append_logs(&run_id.to_string(), &state.log.snapshot())
        .await?;

    // Print summary
    println!();
    println!("  Run:       {run_id}");
    println!("  Stage:     {}", state.current_stage);
    println!("  URLs:      {}", state.urls_to_process.len());
    println!("  Articles:  {}", state.articles.len());
    println!("  Extracted: {}", state.extracted.len());
    println!("  Approved:  {}", state.reviewed.len());
    println!("  Uploaded:  {}", if state.upload_done { "yes" } else { "no" });
    println!();

    if state.current_stage == Stage::ErrorEnd {
        return Err(eyre!(
            "run {run_id} failed — inspect the log with `newsgraph logs {run_id}`"
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl RunObserver for CliProgress {
    fn stage_changed(&self, status: &RunStatus) {
        self.spinner.set_message(format!("stage: {}", status.stage));
    }
}

// ---------------------------------------------------------------------------
// history / logs
// ---------------------------------------------------------------------------

async fn open_history_db() -> Result<Storage> {
    let db_path = config_dir()?.join("history.db");
    Ok(Storage::open(&db_path).await?)
}

async fn cmd_history(limit: u32) -> Result<()> {
    let storage = open_history_db().await?;
    let runs = storage.list_runs(limit).await?;

    if runs.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for run in runs {
        println!(
            "{}  {:<22}  uploaded={}  {}",
            run.id,
            run.stage,
            if run.upload_done { "yes" } else { "no " },
            run.query
        );
    }
    Ok(())
}

async fn cmd_logs(run_id: &str) -> Result<()> {
    let storage = open_history_db().await?;

    if storage.get_run(run_id).await?.is_none() {
        return Err(eyre!("no run found with ID '{run_id}'"));
    }

    for entry in storage.run_logs(run_id).await? {
        println!(
            "{}  {:<7}  {}",
            entry.timestamp.to_rfc3339(),
            entry.level,
            entry.message
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
