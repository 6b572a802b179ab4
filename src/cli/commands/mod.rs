//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod metrics;
mod records;
mod score;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nps_dashboard::{Category, Config, HttpScoringClient};

#[derive(Parser)]
#[command(name = "nps")]
#[command(about = "Customer satisfaction dashboard: sentiment scoring and NPS")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scoring service base URL (overrides config)
    #[arg(long, global = true, env = "NPS_ENDPOINT")]
    endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run sentiment analysis over pending evaluations (Ctrl-C stops after the current batch)
    Score {
        /// Evaluations scored per service call (default from config, 1 if unset)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        batch_size: Option<u32>,
        /// Output the run outcome and metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the Net Promoter Score of scored evaluations
    Metrics {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List evaluations
    Records {
        /// List pending (unscored) evaluations instead of scored ones
        #[arg(long)]
        pending: bool,
        /// Only show these categories (repeatable)
        #[arg(long, value_enum, conflicts_with = "pending")]
        category: Vec<Category>,
        /// Maximum number of rows
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show counts of total, scored and pending evaluations
    Status,
}

/// Parse arguments, load configuration and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(path).await?,
        None => Config::load().await?,
    };
    if let Some(endpoint) = cli.endpoint {
        config.service = config.service.with_endpoint(&endpoint);
    }
    config.validate()?;

    let client = HttpScoringClient::new(config.service.clone())?;

    match cli.command {
        Commands::Score { batch_size, json } => {
            if let Some(n) = batch_size {
                config.scoring.batch_size = n;
            }
            score::cmd_score(client, config.batch_size()?, json).await
        }
        Commands::Metrics { json } => metrics::cmd_metrics(&client, json).await,
        Commands::Records {
            pending,
            category,
            limit,
        } => records::cmd_records(&client, pending, &category, limit).await,
        Commands::Status => status::cmd_status(&client).await,
    }
}
