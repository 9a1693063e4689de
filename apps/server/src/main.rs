//! NewsGraph HTTP server — start runs, poll status, read logs.

mod api;

use clap::Parser;
use color_eyre::eyre::Result;

/// NewsGraph API server.
#[derive(Parser)]
#[command(name = "newsgraph-server", version, about = "HTTP front end for the NewsGraph pipeline.")]
struct Cli {
    /// Port to listen on.
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(cli: &Cli) {
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
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli);

    let app = api::build_app().await?;

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "newsgraph server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
