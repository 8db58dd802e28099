//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod report;

const DEFAULT_LOG_FILTER: &str = "forecast=info,forecast_core=info,sqlx=warn";

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the config layer reports what is actually missing.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    if let Err(err) = cmd.run().await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` if set (including from `.env`), otherwise the crate defaults.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}
