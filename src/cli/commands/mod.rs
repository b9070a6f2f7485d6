//! Command implementations.

pub mod enrich;
pub mod ingest;
pub mod init;
pub mod status;

use std::path::Path;

use crate::repository::{DisasterRepository, SqlitePool, TopicRepository};

/// Open both repositories over one pool, creating schemas if needed.
pub async fn open_store(
    database_path: &Path,
) -> anyhow::Result<(DisasterRepository, TopicRepository)> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let pool = SqlitePool::from_path(database_path);
    let disasters = DisasterRepository::open(pool.clone()).await?;
    let topics = TopicRepository::open(pool).await?;
    Ok((disasters, topics))
}
