//! Raw row validation and normalization.
//!
//! Turns a qualifying feed row into a canonical `DisasterRecord` or a
//! typed row-level failure. The caller accumulates failures and keeps
//! going; nothing here aborts a day.

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::classify::Classifier;
use crate::feed::{RawEventRow, RawGeo};
use crate::models::{DisasterRecord, GeoPoint};

/// Row-level validation failure.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("no valid location for event {event_id}")]
    InvalidLocation { event_id: String },

    #[error("invalid date {value:?} for event {event_id}")]
    InvalidDate { event_id: String, value: String },
}

/// Location fields taken together from one accepted geography block.
struct ResolvedLocation {
    point: GeoPoint,
    name: Option<String>,
    country_code: Option<String>,
}

/// Validates rows and assembles records, delegating type and severity
/// to the classifier.
#[derive(Debug, Clone)]
pub struct Transformer {
    classifier: Classifier,
}

impl Transformer {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Transform one raw row into a record candidate.
    pub fn transform(&self, row: &RawEventRow) -> Result<DisasterRecord, TransformError> {
        let location = resolve_location(row).ok_or_else(|| TransformError::InvalidLocation {
            event_id: row.event_id.clone(),
        })?;

        let date = NaiveDate::parse_from_str(row.date.trim(), "%Y%m%d").map_err(|_| {
            TransformError::InvalidDate {
                event_id: row.event_id.clone(),
                value: row.date.clone(),
            }
        })?;

        // Scores default to 0 when missing or unparseable; only the
        // date and location are hard requirements.
        let goldstein: f64 = row.goldstein.trim().parse().unwrap_or(0.0);
        let tone: f64 = row.tone.trim().parse().unwrap_or(0.0);
        let mentions = parse_count(&row.mentions);
        let articles = parse_count(&row.articles);
        let sources = parse_count(&row.sources);

        let keywords = self
            .classifier
            .extract_keywords(&row.actor1_name, &row.actor2_name);
        let disaster_type = self.classifier.classify(
            &row.event_code,
            &row.base_code,
            &row.actor1_name,
            &row.actor2_name,
        );
        let severity = self.classifier.severity(goldstein, mentions, tone);

        Ok(DisasterRecord {
            event_id: row.event_id.clone(),
            date,
            location: location.point,
            location_name: location.name,
            country_code: location.country_code,
            actor1: non_empty(&row.actor1_name),
            actor2: non_empty(&row.actor2_name),
            event_code: row.event_code.clone(),
            base_code: row.base_code.clone(),
            root_code: row.root_code.clone(),
            goldstein,
            tone,
            mentions,
            articles,
            sources,
            disaster_type,
            severity,
            keywords,
            source_url: non_empty(&row.source_url),
            processed_date: Utc::now(),
            topic: None,
            cluster_id: None,
            analysis_date: None,
        })
    }
}

/// Try the geography blocks in priority order: action location first,
/// then actor-1's location. A candidate is accepted only if both
/// coordinates parse and are in range; the accepted block supplies the
/// name and country code as well.
fn resolve_location(row: &RawEventRow) -> Option<ResolvedLocation> {
    [&row.action_geo, &row.actor1_geo]
        .into_iter()
        .find_map(resolve_geo)
}

fn resolve_geo(geo: &RawGeo) -> Option<ResolvedLocation> {
    let lat: f64 = geo.lat.trim().parse().ok()?;
    let lon: f64 = geo.lon.trim().parse().ok()?;
    let point = GeoPoint::new(lon, lat);
    if !point.is_valid() {
        return None;
    }
    Some(ResolvedLocation {
        point,
        name: non_empty(&geo.full_name),
        country_code: non_empty(&geo.country_code),
    })
}

fn parse_count(value: &str) -> i32 {
    value.trim().parse().map(|n: i32| n.max(0)).unwrap_or(0)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
