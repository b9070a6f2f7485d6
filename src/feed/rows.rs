//! Daily export row schema and parsing.
//!
//! The export is tab-separated with a fixed 58-column layout, from
//! `GLOBALEVENTID` at index 0 through `SOURCEURL` at index 57. Only the
//! fields the pipeline consumes are retained; everything else is
//! dropped at parse time.

use thiserror::Error;

/// Column count of the daily export schema.
pub const COLUMN_COUNT: usize = 58;

/// Column indexes into the export schema.
pub mod columns {
    pub const GLOBAL_EVENT_ID: usize = 0;
    pub const SQLDATE: usize = 1;
    pub const ACTOR1_NAME: usize = 6;
    pub const ACTOR2_NAME: usize = 16;
    pub const EVENT_CODE: usize = 26;
    pub const EVENT_BASE_CODE: usize = 27;
    pub const EVENT_ROOT_CODE: usize = 28;
    pub const GOLDSTEIN_SCALE: usize = 30;
    pub const NUM_MENTIONS: usize = 31;
    pub const NUM_SOURCES: usize = 32;
    pub const NUM_ARTICLES: usize = 33;
    pub const AVG_TONE: usize = 34;
    pub const ACTOR1_GEO_FULLNAME: usize = 36;
    pub const ACTOR1_GEO_COUNTRYCODE: usize = 37;
    pub const ACTOR1_GEO_LAT: usize = 39;
    pub const ACTOR1_GEO_LONG: usize = 40;
    pub const ACTION_GEO_FULLNAME: usize = 50;
    pub const ACTION_GEO_COUNTRYCODE: usize = 51;
    pub const ACTION_GEO_LAT: usize = 53;
    pub const ACTION_GEO_LONG: usize = 54;
    pub const SOURCE_URL: usize = 57;
}

/// A geography block of the export (the feed carries three; the
/// pipeline uses the action and actor-1 blocks).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeo {
    pub full_name: String,
    pub country_code: String,
    pub lat: String,
    pub lon: String,
}

/// One parsed export line. Field values are kept as the raw feed
/// strings; validation and coercion happen in the transformer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEventRow {
    pub event_id: String,
    /// Event date as `YYYYMMDD`.
    pub date: String,
    pub actor1_name: String,
    pub actor2_name: String,
    pub event_code: String,
    pub base_code: String,
    pub root_code: String,
    pub goldstein: String,
    pub mentions: String,
    pub sources: String,
    pub articles: String,
    pub tone: String,
    pub action_geo: RawGeo,
    pub actor1_geo: RawGeo,
    pub source_url: String,
}

/// Row-level shape failure. Skips the row, never the day.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("expected {COLUMN_COUNT} columns, found {found}")]
    ColumnCount { found: usize },
}

impl RawEventRow {
    /// Parse one tab-separated export line.
    pub fn parse(line: &str) -> Result<Self, RowError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COLUMN_COUNT {
            return Err(RowError::ColumnCount {
                found: fields.len(),
            });
        }

        use columns::*;
        Ok(Self {
            event_id: fields[GLOBAL_EVENT_ID].to_string(),
            date: fields[SQLDATE].to_string(),
            actor1_name: fields[ACTOR1_NAME].to_string(),
            actor2_name: fields[ACTOR2_NAME].to_string(),
            event_code: fields[EVENT_CODE].to_string(),
            base_code: fields[EVENT_BASE_CODE].to_string(),
            root_code: fields[EVENT_ROOT_CODE].to_string(),
            goldstein: fields[GOLDSTEIN_SCALE].to_string(),
            mentions: fields[NUM_MENTIONS].to_string(),
            sources: fields[NUM_SOURCES].to_string(),
            articles: fields[NUM_ARTICLES].to_string(),
            tone: fields[AVG_TONE].to_string(),
            action_geo: RawGeo {
                full_name: fields[ACTION_GEO_FULLNAME].to_string(),
                country_code: fields[ACTION_GEO_COUNTRYCODE].to_string(),
                lat: fields[ACTION_GEO_LAT].to_string(),
                lon: fields[ACTION_GEO_LONG].to_string(),
            },
            actor1_geo: RawGeo {
                full_name: fields[ACTOR1_GEO_FULLNAME].to_string(),
                country_code: fields[ACTOR1_GEO_COUNTRYCODE].to_string(),
                lat: fields[ACTOR1_GEO_LAT].to_string(),
                lon: fields[ACTOR1_GEO_LONG].to_string(),
            },
            source_url: fields[SOURCE_URL].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with(set: &[(usize, &str)]) -> String {
        let mut fields = vec![String::new(); COLUMN_COUNT];
        for (idx, value) in set {
            fields[*idx] = value.to_string();
        }
        fields.join("\t")
    }

    #[test]
    fn test_parse_extracts_fields() {
        use columns::*;
        let line = line_with(&[
            (GLOBAL_EVENT_ID, "123456"),
            (SQLDATE, "20250601"),
            (ACTOR1_NAME, "EARTHQUAKE VICTIMS"),
            (EVENT_CODE, "0231"),
            (EVENT_BASE_CODE, "023"),
            (GOLDSTEIN_SCALE, "-9.5"),
            (NUM_MENTIONS, "120"),
            (AVG_TONE, "-6.1"),
            (ACTION_GEO_FULLNAME, "Tokyo, Japan"),
            (ACTION_GEO_COUNTRYCODE, "JA"),
            (ACTION_GEO_LAT, "35.68"),
            (ACTION_GEO_LONG, "139.69"),
            (SOURCE_URL, "http://news.example.test/quake"),
        ]);

        let row = RawEventRow::parse(&line).unwrap();
        assert_eq!(row.event_id, "123456");
        assert_eq!(row.date, "20250601");
        assert_eq!(row.event_code, "0231");
        assert_eq!(row.goldstein, "-9.5");
        assert_eq!(row.action_geo.lat, "35.68");
        assert_eq!(row.action_geo.full_name, "Tokyo, Japan");
        assert_eq!(row.actor1_geo, RawGeo::default());
        assert_eq!(row.source_url, "http://news.example.test/quake");
    }

    #[test]
    fn test_parse_rejects_wrong_column_count() {
        let short = vec![""; COLUMN_COUNT - 1].join("\t");
        let long = vec![""; COLUMN_COUNT + 3].join("\t");
        assert!(matches!(
            RawEventRow::parse(&short),
            Err(RowError::ColumnCount { found }) if found == COLUMN_COUNT - 1
        ));
        assert!(matches!(
            RawEventRow::parse(&long),
            Err(RowError::ColumnCount { found }) if found == COLUMN_COUNT + 3
        ));
        assert!(RawEventRow::parse("").is_err());
    }
}
