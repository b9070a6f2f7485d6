//! Topic definition repository.
//!
//! Topics are not versioned: every enrichment run replaces the whole
//! collection in one transaction.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};

use super::models::{to_json_list, TopicRow};
use super::pool::{DbError, SqlitePool};
use crate::models::TopicDefinition;
use crate::schema::topics;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS topics (
    topic_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    keywords TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);
"#;

/// SQLite-backed topic definition repository.
#[derive(Clone)]
pub struct TopicRepository {
    pool: SqlitePool,
}

impl TopicRepository {
    /// Open the repository, creating the schema if needed.
    pub async fn open(pool: SqlitePool) -> Result<Self, DbError> {
        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        conn.batch_execute(DDL).await?;
        Ok(())
    }

    /// Replace the whole collection (delete-all, insert-all) atomically.
    pub async fn replace_all(
        &self,
        definitions: &[TopicDefinition],
        created_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let created_at = created_at.to_rfc3339();

        conn.transaction::<_, DbError, _>(|conn| {
            async move {
                diesel::delete(topics::table).execute(conn).await?;

                for def in definitions {
                    diesel::insert_into(topics::table)
                        .values((
                            topics::topic_id.eq(def.topic_id),
                            topics::name.eq(&def.name),
                            topics::keywords.eq(to_json_list(&def.keywords)),
                            topics::created_at.eq(&created_at),
                        ))
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    /// Load all topics, ordered by id.
    pub async fn all(&self) -> Result<Vec<TopicDefinition>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<TopicRow> = topics::table
            .order(topics::topic_id.asc())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(TopicRow::into_definition).collect())
    }

    /// Count stored topics.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        topics::table
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
    }
}
