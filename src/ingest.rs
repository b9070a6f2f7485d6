//! Ingestion orchestrator.
//!
//! Drives feed -> transform -> store over an inclusive date range, one
//! day at a time. Failures recover at the narrowest possible scope: a
//! malformed or invalid row skips the row, a fetch failure skips the
//! day, a store failure loses that one record. The final report always
//! reflects partial success.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::feed::{FeedSource, FetchError};
use crate::repository::DisasterRepository;
use crate::transform::Transformer;

/// Outcome of one day's ingestion.
#[derive(Debug, Default, Clone)]
pub struct DayOutcome {
    /// Candidate rows the feed returned.
    pub fetched: usize,
    /// Records upserted into the store.
    pub written: usize,
    /// Rows rejected by validation.
    pub skipped: usize,
    /// Records lost to store-write failures.
    pub store_failures: usize,
}

/// Accumulated outcome of a range run.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    pub days_processed: u32,
    pub days_failed: u32,
    pub rows_fetched: usize,
    pub records_written: usize,
    pub rows_skipped: usize,
    pub store_failures: usize,
}

impl IngestReport {
    pub fn absorb_day(&mut self, outcome: &DayOutcome) {
        self.days_processed += 1;
        self.rows_fetched += outcome.fetched;
        self.records_written += outcome.written;
        self.rows_skipped += outcome.skipped;
        self.store_failures += outcome.store_failures;
    }

    pub fn note_day_failed(&mut self) {
        self.days_failed += 1;
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ingestion Complete ===")?;
        writeln!(f, "Days processed:  {}", self.days_processed)?;
        writeln!(f, "Days failed:     {}", self.days_failed)?;
        writeln!(f, "Rows fetched:    {}", self.rows_fetched)?;
        writeln!(f, "Records written: {}", self.records_written)?;
        writeln!(f, "Rows skipped:    {}", self.rows_skipped)?;
        writeln!(f, "Store failures:  {}", self.store_failures)?;
        Ok(())
    }
}

/// Sequential date-range ingestion service.
pub struct IngestService {
    feed: Arc<dyn FeedSource>,
    repo: DisasterRepository,
    transformer: Transformer,
}

impl IngestService {
    pub fn new(feed: Arc<dyn FeedSource>, repo: DisasterRepository, transformer: Transformer) -> Self {
        Self {
            feed,
            repo,
            transformer,
        }
    }

    /// Ingest one day: fetch, transform, upsert.
    pub async fn run_day(&self, date: NaiveDate) -> Result<DayOutcome, FetchError> {
        let rows = self.feed.fetch_day(date).await?;

        let mut outcome = DayOutcome {
            fetched: rows.len(),
            ..Default::default()
        };

        for row in &rows {
            match self.transformer.transform(row) {
                Ok(record) => match self.repo.upsert(&record).await {
                    Ok(()) => outcome.written += 1,
                    Err(e) => {
                        outcome.store_failures += 1;
                        error!(event_id = %record.event_id, error = %e, "failed to persist record");
                    }
                },
                Err(e) => {
                    outcome.skipped += 1;
                    debug!(error = %e, "skipping invalid row");
                }
            }
        }

        info!(
            %date,
            written = outcome.written,
            skipped = outcome.skipped,
            "day ingested"
        );
        Ok(outcome)
    }

    /// Ingest an inclusive date range, day by day in increasing order.
    /// A day's fetch failure is logged and the range continues.
    pub async fn run_range(&self, start: NaiveDate, end: NaiveDate) -> IngestReport {
        let mut report = IngestReport::default();
        let mut date = start;
        while date <= end {
            match self.run_day(date).await {
                Ok(outcome) => report.absorb_day(&outcome),
                Err(e) => {
                    report.note_day_failed();
                    warn!(%date, error = %e, "skipping day after fetch failure");
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        report
    }
}
