//! Disaster record repository.
//!
//! Writes are keyed by the natural `event_id`: `replace_into` gives
//! replace-if-exists semantics, so re-ingesting a day is idempotent.
//! Read methods cover the contract the external consumers rely on
//! (recent window, date range, bounding box, per-type counts).

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};
use tracing::info;

use super::models::{to_json_list, DisasterRow, DATE_FORMAT};
use super::pool::{DbError, SqlitePool};
use crate::models::{DisasterRecord, EnrichmentUpdate};
use crate::schema::disasters;

/// Default window for the recent-records query.
pub const DEFAULT_RECENT_LIMIT: i64 = 2000;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS disasters (
    event_id TEXT PRIMARY KEY,
    date TEXT NOT NULL,
    lon REAL NOT NULL,
    lat REAL NOT NULL,
    location_name TEXT,
    country_code TEXT,
    actor1 TEXT,
    actor2 TEXT,
    event_code TEXT NOT NULL,
    base_code TEXT NOT NULL,
    root_code TEXT NOT NULL,
    goldstein REAL NOT NULL,
    tone REAL NOT NULL,
    mentions INTEGER NOT NULL,
    articles INTEGER NOT NULL,
    sources INTEGER NOT NULL,
    disaster_type TEXT NOT NULL,
    severity INTEGER NOT NULL,
    keywords TEXT NOT NULL DEFAULT '[]',
    source_url TEXT,
    processed_date TEXT NOT NULL,
    topic_id INTEGER,
    topic_confidence REAL,
    topic_keywords TEXT,
    cluster_id INTEGER,
    analysis_date TEXT
);
CREATE INDEX IF NOT EXISTS idx_disasters_date ON disasters(date);
CREATE INDEX IF NOT EXISTS idx_disasters_event_code ON disasters(event_code);
CREATE INDEX IF NOT EXISTS idx_disasters_type ON disasters(disaster_type);
CREATE INDEX IF NOT EXISTS idx_disasters_location ON disasters(lat, lon);
"#;

/// SQLite-backed disaster record repository.
#[derive(Clone)]
pub struct DisasterRepository {
    pool: SqlitePool,
}

impl DisasterRepository {
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

    /// Upsert a record by `event_id` (replace-if-exists).
    pub async fn upsert(&self, record: &DisasterRecord) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        let date = record.date.format(DATE_FORMAT).to_string();
        let keywords = to_json_list(&record.keywords);
        let processed_date = record.processed_date.to_rfc3339();
        let disaster_type = record.disaster_type.as_str();
        let (topic_id, topic_confidence, topic_keywords) = match &record.topic {
            Some(topic) => (
                Some(topic.topic_id),
                Some(topic.confidence),
                Some(to_json_list(&topic.keywords)),
            ),
            None => (None, None, None),
        };
        let analysis_date = record.analysis_date.map(|dt| dt.to_rfc3339());

        diesel::replace_into(disasters::table)
            .values((
                disasters::event_id.eq(&record.event_id),
                disasters::date.eq(&date),
                disasters::lon.eq(record.location.lon),
                disasters::lat.eq(record.location.lat),
                disasters::location_name.eq(record.location_name.as_deref()),
                disasters::country_code.eq(record.country_code.as_deref()),
                disasters::actor1.eq(record.actor1.as_deref()),
                disasters::actor2.eq(record.actor2.as_deref()),
                disasters::event_code.eq(&record.event_code),
                disasters::base_code.eq(&record.base_code),
                disasters::root_code.eq(&record.root_code),
                disasters::goldstein.eq(record.goldstein),
                disasters::tone.eq(record.tone),
                disasters::mentions.eq(record.mentions),
                disasters::articles.eq(record.articles),
                disasters::sources.eq(record.sources),
                disasters::disaster_type.eq(disaster_type),
                disasters::severity.eq(record.severity),
                disasters::keywords.eq(&keywords),
                disasters::source_url.eq(record.source_url.as_deref()),
                disasters::processed_date.eq(&processed_date),
                disasters::topic_id.eq(topic_id),
                disasters::topic_confidence.eq(topic_confidence),
                disasters::topic_keywords.eq(topic_keywords.as_deref()),
                disasters::cluster_id.eq(record.cluster_id),
                disasters::analysis_date.eq(analysis_date.as_deref()),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Get one record by id.
    pub async fn get(&self, event_id: &str) -> Result<Option<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let row: Option<DisasterRow> = disasters::table
            .find(event_id)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.map(DisasterRow::into_record))
    }

    /// Load the whole store, ordered by date then id for determinism.
    pub async fn all(&self) -> Result<Vec<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<DisasterRow> = disasters::table
            .order((disasters::date.asc(), disasters::event_id.asc()))
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(DisasterRow::into_record).collect())
    }

    /// Count all records.
    pub async fn count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        disasters::table
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
    }

    /// Most recent records by date.
    pub async fn recent(&self, limit: i64) -> Result<Vec<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<DisasterRow> = disasters::table
            .order((disasters::date.desc(), disasters::event_id.desc()))
            .limit(limit)
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(DisasterRow::into_record).collect())
    }

    /// Records within an inclusive calendar-date range.
    pub async fn in_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let start = start.format(DATE_FORMAT).to_string();
        let end = end.format(DATE_FORMAT).to_string();
        let rows: Vec<DisasterRow> = disasters::table
            .filter(disasters::date.ge(start))
            .filter(disasters::date.le(end))
            .order((disasters::date.asc(), disasters::event_id.asc()))
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(DisasterRow::into_record).collect())
    }

    /// Records whose point falls inside a bounding box.
    pub async fn in_bounds(
        &self,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Vec<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<DisasterRow> = disasters::table
            .filter(disasters::lon.ge(min_lon))
            .filter(disasters::lon.le(max_lon))
            .filter(disasters::lat.ge(min_lat))
            .filter(disasters::lat.le(max_lat))
            .order(disasters::event_id.asc())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(DisasterRow::into_record).collect())
    }

    /// Record count per disaster type, largest first.
    pub async fn counts_by_type(&self) -> Result<Vec<(String, i64)>, DbError> {
        let mut conn = self.pool.get().await?;

        let mut counts: Vec<(String, i64)> = disasters::table
            .group_by(disasters::disaster_type)
            .select((disasters::disaster_type, diesel::dsl::count_star()))
            .load(&mut conn)
            .await?;
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(counts)
    }

    /// Highest-impact records: severity first, then mention volume.
    pub async fn top_stories(&self, limit: i64) -> Result<Vec<DisasterRecord>, DbError> {
        let mut conn = self.pool.get().await?;

        let rows: Vec<DisasterRow> = disasters::table
            .order((
                disasters::severity.desc(),
                disasters::mentions.desc(),
                disasters::event_id.asc(),
            ))
            .limit(limit)
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(DisasterRow::into_record).collect())
    }

    /// Earliest and latest record dates, if any records exist.
    pub async fn date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>, DbError> {
        let mut conn = self.pool.get().await?;

        let (min, max): (Option<String>, Option<String>) = disasters::table
            .select((
                diesel::dsl::min(disasters::date),
                diesel::dsl::max(disasters::date),
            ))
            .first(&mut conn)
            .await?;

        Ok(min.zip(max).and_then(|(min, max)| {
            let min = NaiveDate::parse_from_str(&min, DATE_FORMAT).ok()?;
            let max = NaiveDate::parse_from_str(&max, DATE_FORMAT).ok()?;
            Some((min, max))
        }))
    }

    /// Count of records an enrichment run has touched.
    pub async fn enriched_count(&self) -> Result<i64, DbError> {
        let mut conn = self.pool.get().await?;

        disasters::table
            .filter(disasters::analysis_date.is_not_null())
            .select(diesel::dsl::count_star())
            .first(&mut conn)
            .await
    }

    /// Write one enrichment result back to a record.
    pub async fn update_enrichment(
        &self,
        event_id: &str,
        update: &EnrichmentUpdate,
    ) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        let (topic_id, topic_confidence, topic_keywords) = match &update.topic {
            Some(topic) => (
                Some(topic.topic_id),
                Some(topic.confidence),
                Some(to_json_list(&topic.keywords)),
            ),
            None => (None, None, None),
        };
        let analysis_date = update.analysis_date.to_rfc3339();

        let updated = diesel::update(disasters::table.find(event_id))
            .set((
                disasters::topic_id.eq(topic_id),
                disasters::topic_confidence.eq(topic_confidence),
                disasters::topic_keywords.eq(topic_keywords),
                disasters::cluster_id.eq(update.cluster_id),
                disasters::analysis_date.eq(analysis_date),
            ))
            .execute(&mut conn)
            .await?;

        if updated == 0 {
            info!(event_id, "enrichment update matched no record");
        }
        Ok(())
    }
}
