//! Diesel row models and domain conversions.
//!
//! Datetimes are stored as RFC 3339 TEXT, the record's calendar date as
//! `YYYY-MM-DD` TEXT, and keyword lists as JSON TEXT.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::models::{DisasterRecord, DisasterType, GeoPoint, TopicAssignment, TopicDefinition};
use crate::schema;

use super::{parse_datetime, parse_datetime_opt};

/// Stored calendar-date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Disaster record row as stored.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::disasters)]
#[diesel(primary_key(event_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DisasterRow {
    pub event_id: String,
    pub date: String,
    pub lon: f64,
    pub lat: f64,
    pub location_name: Option<String>,
    pub country_code: Option<String>,
    pub actor1: Option<String>,
    pub actor2: Option<String>,
    pub event_code: String,
    pub base_code: String,
    pub root_code: String,
    pub goldstein: f64,
    pub tone: f64,
    pub mentions: i32,
    pub articles: i32,
    pub sources: i32,
    pub disaster_type: String,
    pub severity: i32,
    pub keywords: String,
    pub source_url: Option<String>,
    pub processed_date: String,
    pub topic_id: Option<i32>,
    pub topic_confidence: Option<f64>,
    pub topic_keywords: Option<String>,
    pub cluster_id: Option<i32>,
    pub analysis_date: Option<String>,
}

impl DisasterRow {
    /// Convert a stored row back into the domain record.
    pub fn into_record(self) -> DisasterRecord {
        let topic = match (self.topic_id, self.topic_confidence) {
            (Some(topic_id), Some(confidence)) => Some(TopicAssignment {
                topic_id,
                confidence,
                keywords: parse_json_list(self.topic_keywords.as_deref()),
            }),
            _ => None,
        };

        DisasterRecord {
            date: NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
                .unwrap_or(NaiveDate::MIN),
            location: GeoPoint::new(self.lon, self.lat),
            disaster_type: DisasterType::from_str(&self.disaster_type)
                .unwrap_or(DisasterType::Other),
            keywords: parse_json_list(Some(self.keywords.as_str())),
            processed_date: parse_datetime(&self.processed_date),
            analysis_date: parse_datetime_opt(self.analysis_date),
            topic,
            event_id: self.event_id,
            location_name: self.location_name,
            country_code: self.country_code,
            actor1: self.actor1,
            actor2: self.actor2,
            event_code: self.event_code,
            base_code: self.base_code,
            root_code: self.root_code,
            goldstein: self.goldstein,
            tone: self.tone,
            mentions: self.mentions,
            articles: self.articles,
            sources: self.sources,
            severity: self.severity,
            source_url: self.source_url,
            cluster_id: self.cluster_id,
        }
    }
}

/// Topic definition row as stored.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::topics)]
#[diesel(primary_key(topic_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TopicRow {
    pub topic_id: i32,
    pub name: String,
    pub keywords: String,
    pub created_at: String,
}

impl TopicRow {
    pub fn into_definition(self) -> TopicDefinition {
        TopicDefinition {
            topic_id: self.topic_id,
            name: self.name,
            keywords: parse_json_list(Some(self.keywords.as_str())),
        }
    }
}

/// Serialize a keyword list for storage.
pub fn to_json_list(keywords: &[String]) -> String {
    serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string())
}

fn parse_json_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}
