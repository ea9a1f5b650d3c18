//! Turnover Prediction API - Main Entry Point

use anyhow::Context;
use api::config::Settings;
use api::{init_logging, open_repositories, run_server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "turnover-api", version, about = "Employee turnover prediction service")]
struct Cli {
    /// Configuration file (defaults to config/turnover.toml)
    #[arg(long, env = "TURNOVER_CONFIG", global = true)]
    config: Option<String>,

    /// Database URL, overrides the configured backend
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// Load the CSV extracts into the source tables and exit
    Seed {
        /// Directory holding the extrait_*.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = cli.database_url {
        settings.database.url = Some(url);
    }

    init_logging(&settings.logging);
    info!("=== Turnover Prediction API v{} ===", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(settings).await,
        Command::Seed { data_dir } => {
            let dir = data_dir.unwrap_or(settings.seed.data_dir);
            let url = settings.database.resolve_url();
            open_repositories(&url, Some(&dir))
                .await
                .with_context(|| format!("failed to seed from {}", dir.display()))?;
            info!("Seeding finished");
            Ok(())
        }
    }
}
