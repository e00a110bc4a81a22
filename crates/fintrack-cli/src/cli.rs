//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinTrack - Understand where your money goes
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Expense analysis with AI-powered insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Narrative config file
    ///
    /// Defaults to ~/.local/share/fintrack/config/narrative.toml when present,
    /// otherwise built-in defaults. OPENAI_API_KEY overrides the key.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze expenses for a period
    Analyze {
        /// JSON file with exported expense records
        #[arg(short, long)]
        file: PathBuf,

        /// Period: this-month, last-month, this-year, last-30-days, last-90-days, all
        #[arg(short, long, default_value = "this-month")]
        period: String,

        /// Custom start date (YYYY-MM-DD), requires --to
        #[arg(long)]
        from: Option<String>,

        /// Custom end date (YYYY-MM-DD), requires --from
        #[arg(long)]
        to: Option<String>,

        /// Skip the remote AI call and use rule-based insights
        #[arg(long)]
        offline: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective narrative configuration
    Config,
}
