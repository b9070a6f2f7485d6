//! `ingest` command: run the orchestrator over a date range.

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::classify::Classifier;
use crate::config::Settings;
use crate::feed::FeedClient;
use crate::ingest::{IngestReport, IngestService};
use crate::transform::Transformer;

fn parse_day(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d")
        .with_context(|| format!("invalid date {value:?}, expected YYYYMMDD"))
}

pub async fn run(settings: &Settings, start: &str, end: Option<&str>) -> anyhow::Result<()> {
    let start = parse_day(start)?;
    let end = match end {
        Some(end) => parse_day(end)?,
        None => start,
    };
    anyhow::ensure!(start <= end, "start date is after end date");

    let classifier = Classifier::new(&settings.classifier);
    let feed = FeedClient::new(&settings.feed, classifier.clone())?;
    let (disasters, _topics) = super::open_store(&settings.store.database_path).await?;
    let service = IngestService::new(
        Arc::new(feed),
        disasters,
        Transformer::new(classifier),
    );

    let days = end.signed_duration_since(start).num_days() as u64 + 1;
    println!(
        "Ingesting {} through {} ({days} days)",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
    );

    let bar = ProgressBar::new(days);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid progress template")
            .progress_chars("#>-"),
    );

    let mut report = IngestReport::default();
    let mut date = start;
    while date <= end {
        bar.set_message(date.format("%Y-%m-%d").to_string());
        match service.run_day(date).await {
            Ok(outcome) => report.absorb_day(&outcome),
            Err(e) => {
                report.note_day_failed();
                bar.println(format!("{} {date}: {e}", style("skipped").yellow()));
            }
        }
        bar.inc(1);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    bar.finish_and_clear();

    println!("{report}");
    Ok(())
}
