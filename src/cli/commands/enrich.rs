//! `enrich` command: run the enrichment pipeline once.

use crate::config::Settings;
use crate::enrich::EnrichmentService;

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let (disasters, topics) = super::open_store(&settings.store.database_path).await?;
    let service = EnrichmentService::new(disasters, topics, settings.enrichment.clone());

    let report = service.run().await?;
    println!("{report}");
    Ok(())
}
