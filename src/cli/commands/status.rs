//! `status` command: record counts and enrichment state.

use console::style;

use crate::config::Settings;

pub async fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let (disasters, topics) = super::open_store(&settings.store.database_path).await?;

    let total = disasters.count().await?;
    let enriched = disasters.enriched_count().await?;
    let bounds = disasters.date_bounds().await?;
    let by_type = disasters.counts_by_type().await?;
    let topic_count = topics.count().await?;

    if json {
        let value = serde_json::json!({
            "database": settings.store.database_path.display().to_string(),
            "records": total,
            "enriched": enriched,
            "topics": topic_count,
            "first_date": bounds.map(|(min, _)| min.format("%Y-%m-%d").to_string()),
            "last_date": bounds.map(|(_, max)| max.format("%Y-%m-%d").to_string()),
            "by_type": by_type
                .iter()
                .map(|(ty, count)| serde_json::json!({"type": ty, "count": count}))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", style("DisasterWatch store").bold());
    println!("  Database: {}", settings.store.database_path.display());
    println!("  Records:  {total} ({enriched} enriched)");
    match bounds {
        Some((min, max)) => println!(
            "  Dates:    {} to {}",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        ),
        None => println!("  Dates:    (empty)"),
    }
    println!("  Topics:   {topic_count}");

    if !by_type.is_empty() {
        println!("\n{}", style("Records by type").bold());
        for (ty, count) in &by_type {
            println!("  {ty:<20} {count}");
        }
    }
    Ok(())
}
