// Diesel table definitions for the disaster store.
// Kept in sync with the DDL in repository::disasters / repository::topics.

diesel::table! {
    disasters (event_id) {
        event_id -> Text,
        date -> Text,
        lon -> Double,
        lat -> Double,
        location_name -> Nullable<Text>,
        country_code -> Nullable<Text>,
        actor1 -> Nullable<Text>,
        actor2 -> Nullable<Text>,
        event_code -> Text,
        base_code -> Text,
        root_code -> Text,
        goldstein -> Double,
        tone -> Double,
        mentions -> Integer,
        articles -> Integer,
        sources -> Integer,
        disaster_type -> Text,
        severity -> Integer,
        keywords -> Text,
        source_url -> Nullable<Text>,
        processed_date -> Text,
        topic_id -> Nullable<Integer>,
        topic_confidence -> Nullable<Double>,
        topic_keywords -> Nullable<Text>,
        cluster_id -> Nullable<Integer>,
        analysis_date -> Nullable<Text>,
    }
}

diesel::table! {
    topics (topic_id) {
        topic_id -> Integer,
        name -> Text,
        keywords -> Text,
        created_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(disasters, topics);
