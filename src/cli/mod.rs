//! CLI parser and dispatch.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "dwatch")]
#[command(about = "GDELT disaster event ingestion and analysis")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML; defaults to ./disasterwatch.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file path (overrides config)
    #[arg(long, global = true, env = "DISASTERWATCH_DB")]
    database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    Init,

    /// Ingest a date range from the daily export feed
    Ingest {
        /// First day to ingest (YYYYMMDD)
        #[arg(long)]
        start: String,
        /// Last day to ingest, inclusive (YYYYMMDD); defaults to start
        #[arg(long)]
        end: Option<String>,
    },

    /// Run topic modeling and spatial-temporal clustering over the store
    Enrich,

    /// Show record counts and enrichment state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments, load settings, and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        settings.store.database_path = database;
    }

    match cli.command {
        Commands::Init => commands::init::run(&settings).await,
        Commands::Ingest { start, end } => commands::ingest::run(&settings, &start, end.as_deref()).await,
        Commands::Enrich => commands::enrich::run(&settings).await,
        Commands::Status { json } => commands::status::run(&settings, json).await,
    }
}
