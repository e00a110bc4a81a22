//! FinTrack CLI - Expense analysis with AI-powered insights
//!
//! Usage:
//!   fintrack analyze --file expenses.json --period last-month
//!   fintrack analyze --file expenses.json --from 2024-01-01 --to 2024-01-31 --json
//!   fintrack config

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Analyze {
            file,
            period,
            from,
            to,
            offline,
            json,
        } => {
            let (from_date, to_date) =
                commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
            commands::cmd_analyze(
                cli.config.as_deref(),
                &file,
                from_date,
                to_date,
                offline,
                json,
            )
            .await
        }
        Commands::Config => commands::cmd_config(cli.config.as_deref()),
    }
}
