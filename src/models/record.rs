//! Canonical disaster record types.
//!
//! A `DisasterRecord` is the persisted entity produced by ingestion and
//! augmented in place by the enrichment pipeline. Records are keyed by
//! the feed's natural event identifier; re-ingesting an id replaces the
//! stored record rather than duplicating it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to a disaster event.
///
/// Code-mapped subtypes come from the disaster-code table; `Storm` and
/// `Accident` are only reachable through keyword classification; `Other`
/// is the total fallback (classification never fails).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterType {
    Earthquake,
    Flood,
    Drought,
    HurricaneTyphoon,
    Wildfire,
    VolcanicActivity,
    Landslide,
    Tsunami,
    TerroristAttack,
    ArmedConflict,
    Explosion,
    IndustrialAccident,
    ChemicalSpill,
    NuclearIncident,
    Storm,
    Accident,
    Other,
}

impl DisasterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Flood => "flood",
            Self::Drought => "drought",
            Self::HurricaneTyphoon => "hurricane_typhoon",
            Self::Wildfire => "wildfire",
            Self::VolcanicActivity => "volcanic_activity",
            Self::Landslide => "landslide",
            Self::Tsunami => "tsunami",
            Self::TerroristAttack => "terrorist_attack",
            Self::ArmedConflict => "armed_conflict",
            Self::Explosion => "explosion",
            Self::IndustrialAccident => "industrial_accident",
            Self::ChemicalSpill => "chemical_spill",
            Self::NuclearIncident => "nuclear_incident",
            Self::Storm => "storm",
            Self::Accident => "accident",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "earthquake" => Some(Self::Earthquake),
            "flood" => Some(Self::Flood),
            "drought" => Some(Self::Drought),
            "hurricane_typhoon" => Some(Self::HurricaneTyphoon),
            "wildfire" => Some(Self::Wildfire),
            "volcanic_activity" => Some(Self::VolcanicActivity),
            "landslide" => Some(Self::Landslide),
            "tsunami" => Some(Self::Tsunami),
            "terrorist_attack" => Some(Self::TerroristAttack),
            "armed_conflict" => Some(Self::ArmedConflict),
            "explosion" => Some(Self::Explosion),
            "industrial_accident" => Some(Self::IndustrialAccident),
            "chemical_spill" => Some(Self::ChemicalSpill),
            "nuclear_incident" => Some(Self::NuclearIncident),
            "storm" => Some(Self::Storm),
            "accident" => Some(Self::Accident),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point stored in (lon, lat) order, matching the geospatial-index
/// convention of the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Both coordinates finite and within valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Topic assignment produced by the enrichment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub topic_id: i32,
    /// Probability of the dominant topic for this record.
    pub confidence: f64,
    /// Top keywords of the dominant topic (at most five are persisted).
    pub keywords: Vec<String>,
}

/// The canonical persisted disaster event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasterRecord {
    /// Natural key from the feed; unique in the store.
    pub event_id: String,
    /// Calendar date of the event, no time component.
    pub date: NaiveDate,
    pub location: GeoPoint,
    pub location_name: Option<String>,
    pub country_code: Option<String>,
    pub actor1: Option<String>,
    pub actor2: Option<String>,
    pub event_code: String,
    pub base_code: String,
    pub root_code: String,
    /// Goldstein scale value, typically [-10, 10].
    pub goldstein: f64,
    /// Average tone of source articles.
    pub tone: f64,
    pub mentions: i32,
    pub articles: i32,
    pub sources: i32,
    pub disaster_type: DisasterType,
    /// Derived severity, always within [1, 5].
    pub severity: i32,
    /// Disaster keywords matched in the actor names.
    pub keywords: Vec<String>,
    pub source_url: Option<String>,
    /// Ingestion timestamp.
    pub processed_date: DateTime<Utc>,
    /// Set by the enrichment pipeline; None until it has run.
    pub topic: Option<TopicAssignment>,
    /// Spatial-temporal cluster; None means noise/unclustered.
    pub cluster_id: Option<i32>,
    /// Timestamp of the last enrichment run that touched this record.
    pub analysis_date: Option<DateTime<Utc>>,
}

/// Per-record fields written back by one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichmentUpdate {
    pub topic: Option<TopicAssignment>,
    pub cluster_id: Option<i32>,
    pub analysis_date: DateTime<Utc>,
}

/// A topic discovered by the enrichment pipeline.
///
/// The collection is fully replaced on every run; topics are not
/// versioned or merged across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicDefinition {
    pub topic_id: i32,
    /// Display name, `Topic_{id}`.
    pub name: String,
    /// Top keywords, strongest first.
    pub keywords: Vec<String>,
}

impl TopicDefinition {
    pub fn new(topic_id: i32, keywords: Vec<String>) -> Self {
        Self {
            name: format!("Topic_{topic_id}"),
            topic_id,
            keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(13.4, 52.5).is_valid());
        assert!(GeoPoint::new(-180.0, -90.0).is_valid());
        assert!(!GeoPoint::new(13.4, 95.0).is_valid());
        assert!(!GeoPoint::new(181.0, 52.5).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 52.5).is_valid());
    }

    #[test]
    fn test_disaster_type_round_trip() {
        for ty in [
            DisasterType::Earthquake,
            DisasterType::HurricaneTyphoon,
            DisasterType::ChemicalSpill,
            DisasterType::Other,
        ] {
            assert_eq!(DisasterType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(DisasterType::from_str("meteor"), None);
    }

    #[test]
    fn test_topic_definition_name() {
        let topic = TopicDefinition::new(3, vec!["flood".to_string()]);
        assert_eq!(topic.name, "Topic_3");
    }
}
