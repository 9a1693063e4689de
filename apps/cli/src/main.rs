//! NewsGraph CLI — query-to-knowledge-graph pipeline runner.
//!
//! Turns a user query into searched, scraped, extracted, reviewed, and
//! graph-uploaded article knowledge.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
