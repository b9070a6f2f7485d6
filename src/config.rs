//! Configuration management.
//!
//! Settings load from an optional TOML file, with environment variables
//! overriding the file and CLI flags overriding both. Every table the
//! pipeline consults (disaster codes, keywords, severity thresholds,
//! topic and cluster parameters) lives here; nothing is hard-coded in
//! the pipeline modules.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::DisasterType;

/// Default base URL of the daily export feed.
pub const DEFAULT_FEED_BASE_URL: &str = "http://data.gdeltproject.org/events";

/// Default bound on a single feed retrieval.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default store location.
pub const DEFAULT_DATABASE_PATH: &str = "disasterwatch.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feed: FeedSettings,
    pub store: StoreSettings,
    pub classifier: ClassifierSettings,
    pub enrichment: EnrichmentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Base URL; the day's archive lives at `{base_url}/{YYYYMMDD}.export.CSV.zip`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FEED_BASE_URL.to_string(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database file.
    pub database_path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Event/base code to disaster type, exact match.
    pub disaster_codes: BTreeMap<String, DisasterType>,
    /// Keywords matched case-insensitively as substrings of actor names.
    /// Used both by the feed pre-filter and for the record keyword set.
    pub keywords: Vec<String>,
    pub severity: SeverityThresholds,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            disaster_codes: canonical_disaster_codes(),
            keywords: canonical_keywords(),
            severity: SeverityThresholds::default(),
        }
    }
}

/// Cut points of the additive severity formula. Each contribution fires
/// when the value is at or past the threshold; the summed score is
/// clamped to [1, 5].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    /// Goldstein at or below this adds 3.
    pub goldstein_severe: f64,
    /// Goldstein at or below this adds 2.
    pub goldstein_high: f64,
    /// Goldstein at or below this adds 1.
    pub goldstein_moderate: f64,
    /// Mention count at or above this adds 2.
    pub mentions_major: i32,
    /// Mention count at or above this adds 1.
    pub mentions_notable: i32,
    /// Tone at or below this adds 1.
    pub tone_negative: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            goldstein_severe: -8.0,
            goldstein_high: -5.0,
            goldstein_moderate: -2.0,
            mentions_major: 100,
            mentions_notable: 50,
            tone_negative: -5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub topics: TopicModelSettings,
    pub clustering: ClusterSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicModelSettings {
    /// Fixed topic count.
    pub n_topics: usize,
    /// Vocabulary cap, by total corpus frequency.
    pub max_features: usize,
    /// A term must appear in at least this many documents.
    pub min_doc_freq: usize,
    /// Bounded Gibbs sweep count.
    pub sweeps: usize,
    /// RNG seed; runs with the same seed and corpus are identical.
    pub seed: u64,
}

impl Default for TopicModelSettings {
    fn default() -> Self {
        Self {
            n_topics: 8,
            max_features: 1000,
            min_doc_freq: 2,
            sweeps: 10,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Neighborhood radius in standardized feature space.
    pub eps: f64,
    /// Minimum neighborhood size for a core point.
    pub min_samples: usize,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            eps: 0.3,
            min_samples: 3,
        }
    }
}

impl Settings {
    /// Load settings: TOML file if given (or if `disasterwatch.toml`
    /// exists in the working directory), then environment overrides.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new("disasterwatch.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env();
        Ok(settings)
    }

    /// Parse a TOML settings file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config {}: {e}", path.display()))?;
        Ok(settings)
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DISASTERWATCH_FEED_URL") {
            if !url.is_empty() {
                self.feed.base_url = url;
            }
        }
        if let Ok(db) = std::env::var("DISASTERWATCH_DB") {
            if !db.is_empty() {
                self.store.database_path = PathBuf::from(db);
            }
        }
    }
}

/// The canonical disaster-code table of the source feed.
pub fn canonical_disaster_codes() -> BTreeMap<String, DisasterType> {
    let codes = [
        // Natural disasters
        ("0231", DisasterType::Earthquake),
        ("0232", DisasterType::Flood),
        ("0233", DisasterType::Drought),
        ("0234", DisasterType::HurricaneTyphoon),
        ("0235", DisasterType::Wildfire),
        ("0236", DisasterType::VolcanicActivity),
        ("0237", DisasterType::Landslide),
        ("0238", DisasterType::Tsunami),
        // Man-made disasters
        ("180", DisasterType::TerroristAttack),
        ("190", DisasterType::ArmedConflict),
        ("200", DisasterType::Explosion),
        ("145", DisasterType::IndustrialAccident),
        ("1283", DisasterType::ChemicalSpill),
        ("1284", DisasterType::NuclearIncident),
    ];
    codes
        .into_iter()
        .map(|(code, ty)| (code.to_string(), ty))
        .collect()
}

/// The canonical actor-name keyword list.
pub fn canonical_keywords() -> Vec<String> {
    ["earthquake", "flood", "fire", "storm", "hurricane", "explosion"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_canonical_tables() {
        let settings = Settings::default();
        assert_eq!(settings.classifier.disaster_codes.len(), 14);
        assert_eq!(
            settings.classifier.disaster_codes.get("0231"),
            Some(&DisasterType::Earthquake)
        );
        assert_eq!(settings.classifier.keywords.len(), 6);
        assert_eq!(settings.enrichment.topics.n_topics, 8);
        assert_eq!(settings.enrichment.clustering.eps, 0.3);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [feed]
            base_url = "http://feed.example.test/events"

            [enrichment.topics]
            n_topics = 4
            "#,
        )
        .unwrap();
        assert_eq!(settings.feed.base_url, "http://feed.example.test/events");
        assert_eq!(settings.feed.timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(settings.enrichment.topics.n_topics, 4);
        assert_eq!(settings.enrichment.topics.seed, 42);
        assert_eq!(settings.classifier.severity.mentions_major, 100);
    }
}
