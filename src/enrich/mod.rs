//! Enrichment pipeline.
//!
//! A standalone batch job, independent of ingestion and safe to run at
//! any time: reads the whole store, computes topic assignments and
//! spatial-temporal clusters in memory, and writes the results back per
//! record. A single record's write failure never aborts the batch, and
//! a failed topic-definition replace leaves the already-applied record
//! updates in place.

pub mod cluster;
pub mod text;
pub mod topics;

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::EnrichmentSettings;
use crate::models::{EnrichmentUpdate, TopicAssignment, TopicDefinition};
use crate::repository::{DbError, DisasterRepository, TopicRepository};

use self::cluster::NOISE;
use self::text::VectorizerParams;

/// Failure that prevents the batch from running at all. Everything
/// past the initial corpus read degrades per record instead.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

/// Outcome of one enrichment run.
#[derive(Debug, Default, Clone)]
pub struct EnrichReport {
    pub records: usize,
    pub topics_created: usize,
    pub clusters_found: usize,
    pub records_updated: usize,
    pub records_failed: usize,
}

impl std::fmt::Display for EnrichReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Enrichment Complete ===")?;
        writeln!(f, "Records processed: {}", self.records)?;
        writeln!(f, "Topics created:    {}", self.topics_created)?;
        writeln!(f, "Clusters found:    {}", self.clusters_found)?;
        writeln!(f, "Records updated:   {}", self.records_updated)?;
        writeln!(f, "Records failed:    {}", self.records_failed)?;
        Ok(())
    }
}

/// Batch enrichment over the full stored corpus.
pub struct EnrichmentService {
    disasters: DisasterRepository,
    topics: TopicRepository,
    settings: EnrichmentSettings,
}

impl EnrichmentService {
    pub fn new(
        disasters: DisasterRepository,
        topics: TopicRepository,
        settings: EnrichmentSettings,
    ) -> Self {
        Self {
            disasters,
            topics,
            settings,
        }
    }

    /// Run one enrichment pass.
    pub async fn run(&self) -> Result<EnrichReport, EnrichError> {
        let records = self.disasters.all().await?;
        let mut report = EnrichReport {
            records: records.len(),
            ..Default::default()
        };
        if records.is_empty() {
            info!("store is empty, nothing to enrich");
            return Ok(report);
        }

        // Topic modeling over the whole corpus.
        let texts: Vec<String> = records.iter().map(text::record_document).collect();
        let matrix = text::vectorize(
            &texts,
            &VectorizerParams {
                max_features: self.settings.topics.max_features,
                min_doc_freq: self.settings.topics.min_doc_freq,
            },
        );
        let fitted = topics::fit(&matrix, &self.settings.topics);
        if fitted.is_none() {
            warn!("vocabulary is empty, skipping topic assignment");
        }

        // Spatial-temporal clustering.
        let labels = cluster::assign_clusters(&records, &self.settings.clustering);
        report.clusters_found = labels
            .iter()
            .filter(|&&l| l != NOISE)
            .collect::<HashSet<_>>()
            .len();
        info!(
            records = records.len(),
            clusters = report.clusters_found,
            "computed enrichment"
        );

        // Per-record writeback; one timestamp for the whole run.
        let analysis_date = Utc::now();
        for (i, record) in records.iter().enumerate() {
            let topic = fitted.as_ref().map(|model| {
                let (topic_id, confidence) = model.dominant_topic(i);
                TopicAssignment {
                    topic_id: topic_id as i32,
                    confidence,
                    keywords: model.topic_terms[topic_id]
                        .iter()
                        .take(5)
                        .cloned()
                        .collect(),
                }
            });
            let update = EnrichmentUpdate {
                topic,
                cluster_id: (labels[i] != NOISE).then_some(labels[i]),
                analysis_date,
            };
            match self
                .disasters
                .update_enrichment(&record.event_id, &update)
                .await
            {
                Ok(()) => report.records_updated += 1,
                Err(e) => {
                    report.records_failed += 1;
                    error!(event_id = %record.event_id, error = %e, "failed to update record");
                }
            }
        }

        // Replace the topic collection; non-fatal to the record updates
        // already applied.
        if let Some(model) = &fitted {
            let definitions: Vec<TopicDefinition> = model
                .topic_terms
                .iter()
                .enumerate()
                .map(|(id, terms)| TopicDefinition::new(id as i32, terms.clone()))
                .collect();
            match self.topics.replace_all(&definitions, analysis_date).await {
                Ok(()) => report.topics_created = definitions.len(),
                Err(e) => error!(error = %e, "failed to store topic definitions"),
            }
        }

        Ok(report)
    }
}
