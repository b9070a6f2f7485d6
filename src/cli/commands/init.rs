//! `init` command: create the database and schema.

use console::style;

use crate::config::Settings;

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let path = &settings.store.database_path;
    let (disasters, _topics) = super::open_store(path).await?;

    let count = disasters.count().await?;
    println!(
        "{} {} ({} records)",
        style("Initialized store at").green(),
        path.display(),
        count
    );
    Ok(())
}
