//! Repository layer for store persistence.
//!
//! All store access uses Diesel with compile-time query checking over
//! SQLite. The store is the sole long-lived owner of disaster records
//! and topic definitions; pipeline components hold only transient
//! copies.

mod disasters;
mod models;
mod pool;
mod topics;

pub use disasters::DisasterRepository;
pub use pool::{DbError, SqliteConn, SqlitePool};
pub use topics::TopicRepository;

use chrono::{DateTime, Utc};

/// Parse a datetime string from the store, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the store.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
