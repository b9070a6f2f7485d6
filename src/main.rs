//! DisasterWatch - GDELT disaster event ingestion and analysis system.
//!
//! A tool for collecting disaster-related events from the GDELT daily
//! export feed, classifying and scoring them, and enriching the stored
//! records with topic and cluster assignments.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use disasterwatch::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "disasterwatch=info"
    } else {
        "disasterwatch=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
