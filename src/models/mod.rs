//! Domain models.

mod record;

pub use record::{
    DisasterRecord, DisasterType, EnrichmentUpdate, GeoPoint, TopicAssignment, TopicDefinition,
};
