//! Daily export retrieval.
//!
//! `FeedClient` downloads one day's zipped export over HTTP, unpacks
//! it, parses the rows, and applies the disaster pre-filter. The
//! pre-filter is intentionally loose (recall over precision): the final
//! classification happens downstream in the transformer. No persistence
//! happens here.

mod rows;

pub use rows::{columns, RawEventRow, RawGeo, RowError, COLUMN_COUNT};

use std::io::{Cursor, Read};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::config::FeedSettings;

/// Errors from fetching one day's export. A day-level failure; the
/// orchestrator decides whether to retry or skip.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no export published for {date}")]
    Missing { date: String },

    #[error("unexpected status {status} fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("bad archive for {date}: {reason}")]
    Archive { date: String, reason: String },

    #[error("invalid feed base URL {url}: {reason}")]
    BaseUrl { url: String, reason: String },
}

/// Source of daily feed rows. The HTTP implementation is `FeedClient`;
/// tests substitute a stub.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the disaster-candidate rows for one day.
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEventRow>, FetchError>;
}

/// Pre-filter: a row qualifies if either code is in the disaster-code
/// table, or either actor name contains a disaster keyword.
pub fn is_disaster_candidate(row: &RawEventRow, classifier: &Classifier) -> bool {
    classifier.is_disaster_code(&row.event_code)
        || classifier.is_disaster_code(&row.base_code)
        || !classifier
            .extract_keywords(&row.actor1_name, &row.actor2_name)
            .is_empty()
}

/// HTTP client for the daily export feed.
pub struct FeedClient {
    client: reqwest::Client,
    base_url: String,
    classifier: Classifier,
}

impl FeedClient {
    pub fn new(settings: &FeedSettings, classifier: Classifier) -> Result<Self, FetchError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| FetchError::BaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            base_url,
            classifier,
        })
    }

    /// URL of one day's archive.
    fn day_url(&self, stamp: &str) -> String {
        format!("{}/{}.export.CSV.zip", self.base_url, stamp)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawEventRow>, FetchError> {
        let stamp = date.format("%Y%m%d").to_string();
        let url = self.day_url(&stamp);

        debug!(%url, "downloading daily export");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::Missing { date: stamp });
        }
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| FetchError::Http {
                url: url.clone(),
                source,
            })?;

        let content = extract_export(&bytes, &stamp)?;

        let mut rows = Vec::new();
        let mut malformed = 0usize;
        let mut seen = 0usize;
        for line in content.lines() {
            if line.is_empty() {
                continue;
            }
            seen += 1;
            match RawEventRow::parse(line) {
                Ok(row) => {
                    if is_disaster_candidate(&row, &self.classifier) {
                        rows.push(row);
                    }
                }
                Err(e) => {
                    malformed += 1;
                    debug!(error = %e, "skipping malformed row");
                }
            }
        }

        if malformed > 0 {
            warn!(date = %stamp, malformed, "skipped malformed feed rows");
        }
        info!(
            date = %stamp,
            rows = seen,
            candidates = rows.len(),
            "fetched daily export"
        );

        Ok(rows)
    }
}

/// Unpack the day's export out of its ZIP archive. The entry
/// `{stamp}.export.CSV` is preferred; a single-entry archive with a
/// different name is accepted.
fn extract_export(bytes: &[u8], stamp: &str) -> Result<String, FetchError> {
    let archive_err = |reason: String| FetchError::Archive {
        date: stamp.to_string(),
        reason,
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| archive_err(e.to_string()))?;
    if archive.is_empty() {
        return Err(archive_err("empty archive".to_string()));
    }

    let entry_name = format!("{stamp}.export.CSV");
    let index = archive.index_for_name(&entry_name).unwrap_or(0);
    let mut entry = archive
        .by_index(index)
        .map_err(|e| archive_err(e.to_string()))?;

    let mut raw = Vec::new();
    entry
        .read_to_end(&mut raw)
        .map_err(|e| archive_err(e.to_string()))?;

    // The feed occasionally carries stray non-UTF8 bytes in actor names.
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
