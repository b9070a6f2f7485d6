//! Enrichment pipeline tests over a seeded temporary store.

use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use disasterwatch::config::EnrichmentSettings;
use disasterwatch::enrich::EnrichmentService;
use disasterwatch::models::{DisasterRecord, DisasterType, GeoPoint};
use disasterwatch::repository::{DisasterRepository, SqlitePool, TopicRepository};

fn record(id: &str, lat: f64, lon: f64, actor1: &str, ty: DisasterType) -> DisasterRecord {
    DisasterRecord {
        event_id: id.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        location: GeoPoint::new(lon, lat),
        location_name: None,
        country_code: None,
        actor1: Some(actor1.to_string()),
        actor2: None,
        event_code: "0231".to_string(),
        base_code: "023".to_string(),
        root_code: "02".to_string(),
        goldstein: -3.0,
        tone: -2.0,
        mentions: 20,
        articles: 5,
        sources: 2,
        disaster_type: ty,
        severity: 3,
        keywords: Vec::new(),
        source_url: None,
        processed_date: Utc::now(),
        topic: None,
        cluster_id: None,
        analysis_date: None,
    }
}

async fn open_store(dir: &TempDir) -> (DisasterRepository, TopicRepository) {
    let pool = SqlitePool::from_path(&dir.path().join("test.db"));
    let disasters = DisasterRepository::open(pool.clone()).await.unwrap();
    let topics = TopicRepository::open(pool).await.unwrap();
    (disasters, topics)
}

#[tokio::test]
async fn enrichment_assigns_topics_and_clusters() {
    let dir = TempDir::new().unwrap();
    let (disasters, topics) = open_store(&dir).await;

    // Two dense geographic groups with distinct vocabulary.
    for i in 0..6 {
        disasters
            .upsert(&record(
                &format!("a{i}"),
                23.8 + f64::from(i) * 0.001,
                90.4,
                "FLOOD VICTIMS RIVER DELTA",
                DisasterType::Flood,
            ))
            .await
            .unwrap();
    }
    for i in 0..6 {
        disasters
            .upsert(&record(
                &format!("b{i}"),
                -33.4 + f64::from(i) * 0.001,
                -70.6,
                "EARTHQUAKE SURVIVORS FAULT ZONE",
                DisasterType::Earthquake,
            ))
            .await
            .unwrap();
    }

    let settings = EnrichmentSettings::default();
    let service = EnrichmentService::new(disasters.clone(), topics.clone(), settings.clone());
    let report = service.run().await.unwrap();

    assert_eq!(report.records, 12);
    assert_eq!(report.records_updated, 12);
    assert_eq!(report.records_failed, 0);
    assert_eq!(report.clusters_found, 2);
    assert_eq!(report.topics_created, settings.topics.n_topics);

    let all = disasters.all().await.unwrap();
    let group_a: Vec<_> = all.iter().filter(|r| r.event_id.starts_with('a')).collect();
    let group_b: Vec<_> = all.iter().filter(|r| r.event_id.starts_with('b')).collect();

    let cluster_a = group_a[0].cluster_id.expect("group a clustered");
    let cluster_b = group_b[0].cluster_id.expect("group b clustered");
    assert_ne!(cluster_a, cluster_b);
    assert!(group_a.iter().all(|r| r.cluster_id == Some(cluster_a)));
    assert!(group_b.iter().all(|r| r.cluster_id == Some(cluster_b)));

    for r in &all {
        let topic = r.topic.as_ref().expect("topic assigned");
        assert!((topic.topic_id as usize) < settings.topics.n_topics);
        assert!(topic.confidence > 0.0 && topic.confidence <= 1.0);
        assert!(topic.keywords.len() <= 5);
        assert!(r.analysis_date.is_some());
    }

    // Topic definitions stored for every topic id.
    let defs = topics.all().await.unwrap();
    assert_eq!(defs.len(), settings.topics.n_topics);
    assert_eq!(defs[0].name, "Topic_0");
}

#[tokio::test]
async fn rerunning_replaces_topic_definitions() {
    let dir = TempDir::new().unwrap();
    let (disasters, topics) = open_store(&dir).await;

    for i in 0..4 {
        disasters
            .upsert(&record(
                &format!("r{i}"),
                10.0 + f64::from(i) * 0.001,
                10.0,
                "STORM DAMAGE COAST",
                DisasterType::Storm,
            ))
            .await
            .unwrap();
    }

    let settings = EnrichmentSettings::default();
    let service = EnrichmentService::new(disasters, topics.clone(), settings.clone());
    service.run().await.unwrap();
    service.run().await.unwrap();

    // Delete-all, insert-all: never accumulates across runs.
    assert_eq!(topics.count().await.unwrap() as usize, settings.topics.n_topics);
}

#[tokio::test]
async fn fewer_than_three_records_get_cluster_sentinel() {
    let dir = TempDir::new().unwrap();
    let (disasters, topics) = open_store(&dir).await;

    disasters
        .upsert(&record("1", 10.0, 10.0, "FLOOD VICTIMS", DisasterType::Flood))
        .await
        .unwrap();
    disasters
        .upsert(&record("2", 10.0, 10.0, "FLOOD VICTIMS", DisasterType::Flood))
        .await
        .unwrap();

    let service =
        EnrichmentService::new(disasters.clone(), topics, EnrichmentSettings::default());
    let report = service.run().await.unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(report.clusters_found, 0);
    for r in disasters.all().await.unwrap() {
        // Sentinel maps to the nullable representation.
        assert_eq!(r.cluster_id, None);
        assert!(r.analysis_date.is_some());
        assert!(r.topic.is_some());
    }
}

#[tokio::test]
async fn empty_store_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let (disasters, topics) = open_store(&dir).await;

    let service = EnrichmentService::new(disasters, topics.clone(), EnrichmentSettings::default());
    let report = service.run().await.unwrap();

    assert_eq!(report.records, 0);
    assert_eq!(report.records_updated, 0);
    assert_eq!(topics.count().await.unwrap(), 0);
}
