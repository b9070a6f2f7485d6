//! Spatial-temporal density clustering.
//!
//! DBSCAN over standardized 4-d feature vectors (latitude, longitude,
//! years since epoch, severity). Records without a valid location are
//! excluded from the input and labeled noise; a corpus with fewer than
//! three valid vectors skips clustering entirely.

use chrono::NaiveDate;
use tracing::warn;

use crate::config::ClusterSettings;
use crate::models::DisasterRecord;

/// Label for noise / excluded records.
pub const NOISE: i32 = -1;

/// Minimum valid feature vectors before clustering runs at all.
pub const MIN_CLUSTER_INPUT: usize = 3;

/// Feature vector for one record, or None if its location is unusable.
fn feature_vector(record: &DisasterRecord) -> Option<[f64; 4]> {
    if !record.location.is_valid() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date");
    let days = record.date.signed_duration_since(epoch).num_days() as f64;
    Some([
        record.location.lat,
        record.location.lon,
        days / 365.25,
        f64::from(record.severity),
    ])
}

/// Cluster labels aligned with `records`; `NOISE` for excluded records
/// and density outliers.
pub fn assign_clusters(records: &[DisasterRecord], settings: &ClusterSettings) -> Vec<i32> {
    let mut features: Vec<[f64; 4]> = Vec::new();
    let mut valid_indexes: Vec<usize> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if let Some(f) = feature_vector(record) {
            features.push(f);
            valid_indexes.push(i);
        }
    }

    let mut labels = vec![NOISE; records.len()];
    if features.len() < MIN_CLUSTER_INPUT {
        warn!(
            valid = features.len(),
            min = MIN_CLUSTER_INPUT,
            "not enough valid records for clustering"
        );
        return labels;
    }

    let scaled = standardize(&features);
    let clustered = dbscan(&scaled, settings.eps, settings.min_samples);
    for (j, &i) in valid_indexes.iter().enumerate() {
        labels[i] = clustered[j];
    }
    labels
}

/// Zero mean, unit variance per column. A constant column stays zero.
fn standardize(features: &[[f64; 4]]) -> Vec<[f64; 4]> {
    let n = features.len() as f64;
    let mut means = [0.0f64; 4];
    for f in features {
        for (m, v) in means.iter_mut().zip(f) {
            *m += v;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = [0.0f64; 4];
    for f in features {
        for ((s, v), m) in stds.iter_mut().zip(f).zip(&means) {
            *s += (v - m).powi(2);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt();
    }

    features
        .iter()
        .map(|f| {
            let mut out = [0.0f64; 4];
            for i in 0..4 {
                out[i] = if stds[i] > 0.0 {
                    (f[i] - means[i]) / stds[i]
                } else {
                    0.0
                };
            }
            out
        })
        .collect()
}

fn distance(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn neighbors(points: &[[f64; 4]], idx: usize, eps: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(j, p)| *j != idx && distance(&points[idx], p) <= eps)
        .map(|(j, _)| j)
        .collect()
}

/// Classic DBSCAN; cluster ids start at 0, noise is `NOISE`.
fn dbscan(points: &[[f64; 4]], eps: f64, min_samples: usize) -> Vec<i32> {
    const UNVISITED: i32 = -2;
    let mut labels = vec![UNVISITED; points.len()];
    let mut cluster = 0i32;

    for i in 0..points.len() {
        if labels[i] != UNVISITED {
            continue;
        }
        let seed_neighbors = neighbors(points, i, eps);
        // The point itself counts toward the neighborhood size.
        if seed_neighbors.len() + 1 < min_samples {
            labels[i] = NOISE;
            continue;
        }

        labels[i] = cluster;
        let mut queue = seed_neighbors;
        let mut qi = 0;
        while qi < queue.len() {
            let j = queue[qi];
            qi += 1;
            if labels[j] == NOISE {
                // Border point reached from a core point.
                labels[j] = cluster;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = cluster;
            let next = neighbors(points, j, eps);
            if next.len() + 1 >= min_samples {
                queue.extend(next);
            }
        }
        cluster += 1;
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisasterType, GeoPoint};
    use chrono::Utc;

    fn record(id: &str, lat: f64, lon: f64, severity: i32) -> DisasterRecord {
        DisasterRecord {
            event_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            location: GeoPoint::new(lon, lat),
            location_name: None,
            country_code: None,
            actor1: None,
            actor2: None,
            event_code: String::new(),
            base_code: String::new(),
            root_code: String::new(),
            goldstein: 0.0,
            tone: 0.0,
            mentions: 0,
            articles: 0,
            sources: 0,
            disaster_type: DisasterType::Other,
            severity,
            keywords: Vec::new(),
            source_url: None,
            processed_date: Utc::now(),
            topic: None,
            cluster_id: None,
            analysis_date: None,
        }
    }

    fn default_settings() -> ClusterSettings {
        ClusterSettings {
            eps: 0.3,
            min_samples: 3,
        }
    }

    #[test]
    fn test_fewer_than_three_vectors_all_noise() {
        let records = vec![record("1", 10.0, 10.0, 2), record("2", 10.1, 10.1, 2)];
        let labels = assign_clusters(&records, &default_settings());
        assert_eq!(labels, vec![NOISE, NOISE]);
    }

    #[test]
    fn test_two_dense_groups_form_two_clusters() {
        let mut records = Vec::new();
        for i in 0..4 {
            records.push(record(&format!("a{i}"), 10.0 + i as f64 * 0.001, 10.0, 2));
        }
        for i in 0..4 {
            records.push(record(&format!("b{i}"), -40.0 + i as f64 * 0.001, 120.0, 2));
        }
        let labels = assign_clusters(&records, &default_settings());

        let first = labels[0];
        let second = labels[4];
        assert_ne!(first, NOISE);
        assert_ne!(second, NOISE);
        assert_ne!(first, second);
        assert!(labels[..4].iter().all(|&l| l == first));
        assert!(labels[4..].iter().all(|&l| l == second));
    }

    #[test]
    fn test_isolated_point_is_noise() {
        let mut records = Vec::new();
        for i in 0..5 {
            records.push(record(&format!("a{i}"), 10.0 + i as f64 * 0.001, 10.0, 2));
        }
        records.push(record("lone", 60.0, -150.0, 5));
        let labels = assign_clusters(&records, &default_settings());
        assert!(labels[..5].iter().all(|&l| l >= 0));
        assert_eq!(labels[5], NOISE);
    }

    #[test]
    fn test_standardize_zero_variance_column() {
        let features = vec![[1.0, 2.0, 3.0, 2.0], [2.0, 2.0, 5.0, 2.0], [3.0, 2.0, 7.0, 2.0]];
        let scaled = standardize(&features);
        // Constant columns collapse to zero instead of dividing by zero.
        assert!(scaled.iter().all(|f| f[1] == 0.0 && f[3] == 0.0));
        // Variable columns are centered.
        let mean: f64 = scaled.iter().map(|f| f[0]).sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-12);
    }
}
