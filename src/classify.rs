//! Disaster classification and severity scoring.
//!
//! Classification precedence is fixed: exact event-code match, then
//! exact base-code match, then keyword rules over the actor text in
//! priority order, then `other`. The severity formula is an exact
//! contract: the same inputs must always produce the same score.

use std::collections::BTreeMap;

use crate::config::{ClassifierSettings, SeverityThresholds};
use crate::models::DisasterType;

/// Keyword rules checked in this fixed priority order when neither code
/// matches the table. First rule with any matching term wins.
const KEYWORD_RULES: &[(&[&str], DisasterType)] = &[
    (&["earthquake", "quake"], DisasterType::Earthquake),
    (&["flood", "flooding"], DisasterType::Flood),
    (&["fire", "wildfire"], DisasterType::Wildfire),
    (
        &["storm", "hurricane", "typhoon", "cyclone"],
        DisasterType::Storm,
    ),
    (&["explosion", "blast"], DisasterType::Explosion),
    (&["accident", "crash"], DisasterType::Accident),
];

/// Rule-based classifier and severity scorer.
#[derive(Debug, Clone)]
pub struct Classifier {
    codes: BTreeMap<String, DisasterType>,
    keywords: Vec<String>,
    thresholds: SeverityThresholds,
}

impl Classifier {
    pub fn new(settings: &ClassifierSettings) -> Self {
        Self {
            codes: settings.disaster_codes.clone(),
            keywords: settings
                .keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            thresholds: settings.severity.clone(),
        }
    }

    /// Whether a code is in the disaster-code table.
    pub fn is_disaster_code(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    /// Classify an event. Total: always yields a type, falling back to
    /// `other`.
    pub fn classify(
        &self,
        event_code: &str,
        base_code: &str,
        actor1: &str,
        actor2: &str,
    ) -> DisasterType {
        if let Some(ty) = self.codes.get(event_code) {
            return *ty;
        }
        if let Some(ty) = self.codes.get(base_code) {
            return *ty;
        }

        let text = format!("{} {}", actor1, actor2).to_lowercase();
        for (terms, ty) in KEYWORD_RULES {
            if terms.iter().any(|term| text.contains(term)) {
                return *ty;
            }
        }

        DisasterType::Other
    }

    /// Keywords from the configured list found in either actor name,
    /// case-insensitive substring match, in list order.
    pub fn extract_keywords(&self, actor1: &str, actor2: &str) -> Vec<String> {
        let a1 = actor1.to_lowercase();
        let a2 = actor2.to_lowercase();
        self.keywords
            .iter()
            .filter(|kw| a1.contains(kw.as_str()) || a2.contains(kw.as_str()))
            .cloned()
            .collect()
    }

    /// Severity on a 1-5 scale. Additive: Goldstein band + mention band
    /// + tone penalty, clamped to [1, 5].
    pub fn severity(&self, goldstein: f64, mentions: i32, tone: f64) -> i32 {
        let t = &self.thresholds;
        let mut score = 0;

        // Goldstein scale contribution (more negative = more severe)
        if goldstein <= t.goldstein_severe {
            score += 3;
        } else if goldstein <= t.goldstein_high {
            score += 2;
        } else if goldstein <= t.goldstein_moderate {
            score += 1;
        }

        // Media attention
        if mentions >= t.mentions_major {
            score += 2;
        } else if mentions >= t.mentions_notable {
            score += 1;
        }

        // Tone (more negative = more severe)
        if tone <= t.tone_negative {
            score += 1;
        }

        score.clamp(1, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierSettings;

    fn classifier() -> Classifier {
        Classifier::new(&ClassifierSettings::default())
    }

    #[test]
    fn test_event_code_wins_over_actor_text() {
        let c = classifier();
        assert_eq!(
            c.classify("0231", "", "Massive Flooding Event", ""),
            DisasterType::Earthquake
        );
    }

    #[test]
    fn test_base_code_checked_after_event_code() {
        let c = classifier();
        assert_eq!(c.classify("9999", "0232", "", ""), DisasterType::Flood);
        assert_eq!(
            c.classify("1283", "0232", "", ""),
            DisasterType::ChemicalSpill
        );
    }

    #[test]
    fn test_keyword_precedence() {
        let c = classifier();
        // Flood rule fires before the storm rule even when both match.
        assert_eq!(
            c.classify("9999", "9999", "Flooding After Hurricane", ""),
            DisasterType::Flood
        );
        // "fire" maps to wildfire.
        assert_eq!(
            c.classify("9999", "9999", "", "Forest Fire Brigade"),
            DisasterType::Wildfire
        );
        assert_eq!(
            c.classify("9999", "9999", "Cyclone Watch", ""),
            DisasterType::Storm
        );
        assert_eq!(
            c.classify("9999", "9999", "Train Crash Victims", ""),
            DisasterType::Accident
        );
    }

    #[test]
    fn test_keyword_match_from_single_actor() {
        let c = classifier();
        assert_eq!(
            c.classify("", "", "Massive Flooding Event", ""),
            DisasterType::Flood
        );
        assert_eq!(
            c.classify("", "", "", "Earthquake Survivors"),
            DisasterType::Earthquake
        );
    }

    #[test]
    fn test_classification_falls_back_to_other() {
        let c = classifier();
        assert_eq!(c.classify("", "", "", ""), DisasterType::Other);
        assert_eq!(
            c.classify("1234", "5678", "Government", "Protesters"),
            DisasterType::Other
        );
    }

    #[test]
    fn test_extract_keywords() {
        let c = classifier();
        assert_eq!(
            c.extract_keywords("EARTHQUAKE RELIEF", "flood zone"),
            vec!["earthquake".to_string(), "flood".to_string()]
        );
        assert_eq!(c.extract_keywords("Wildfire Crew", ""), vec!["fire"]);
        assert!(c.extract_keywords("Government", "Citizens").is_empty());
    }

    #[test]
    fn test_severity_worked_example() {
        // goldstein=-9, mentions=120, tone=-6 -> min(3+2+1, 5) = 5
        assert_eq!(classifier().severity(-9.0, 120, -6.0), 5);
    }

    #[test]
    fn test_severity_bands() {
        let c = classifier();
        assert_eq!(c.severity(-8.0, 0, 0.0), 3);
        assert_eq!(c.severity(-5.0, 0, 0.0), 2);
        assert_eq!(c.severity(-2.0, 0, 0.0), 1);
        assert_eq!(c.severity(-1.9, 0, 0.0), 1); // floor clamp
        assert_eq!(c.severity(0.0, 100, 0.0), 2);
        assert_eq!(c.severity(0.0, 50, 0.0), 1);
        assert_eq!(c.severity(0.0, 0, -5.0), 1);
        assert_eq!(c.severity(-10.0, 500, -10.0), 5); // ceiling clamp
    }

    #[test]
    fn test_severity_monotone_in_each_input() {
        let c = classifier();
        let goldsteins = [-10.0, -8.0, -5.0, -2.0, 0.0, 5.0];
        let mentions = [0, 50, 100, 1000];
        let tones = [-10.0, -5.0, 0.0, 5.0];

        for window in goldsteins.windows(2) {
            assert!(c.severity(window[0], 10, 0.0) >= c.severity(window[1], 10, 0.0));
        }
        for window in mentions.windows(2) {
            assert!(c.severity(0.0, window[0], 0.0) <= c.severity(0.0, window[1], 0.0));
        }
        for window in tones.windows(2) {
            assert!(c.severity(0.0, 10, window[0]) >= c.severity(0.0, 10, window[1]));
        }
    }

    #[test]
    fn test_severity_always_in_range() {
        let c = classifier();
        for goldstein in [-10.0, -7.0, -3.0, 0.0, 10.0] {
            for mentions in [0, 49, 50, 99, 100, 10_000] {
                for tone in [-20.0, -5.0, 0.0, 20.0] {
                    let s = c.severity(goldstein, mentions, tone);
                    assert!((1..=5).contains(&s));
                }
            }
        }
    }
}
