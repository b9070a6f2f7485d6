//! Probabilistic topic model over bag-of-words counts.
//!
//! Collapsed Gibbs sampling LDA with a fixed topic count, a seeded RNG,
//! and a bounded sweep count, so a run is fully reproducible for a
//! given corpus and configuration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::TopicModelSettings;

use super::text::DocTermMatrix;

/// Dirichlet prior on document-topic distributions.
const ALPHA: f64 = 0.1;
/// Dirichlet prior on topic-term distributions.
const BETA: f64 = 0.01;
/// Keywords kept per topic definition.
pub const TOP_TERMS: usize = 10;

/// Fitted model output.
#[derive(Debug, Clone)]
pub struct FittedTopics {
    /// Per document: probability over topics, summing to ~1.
    pub doc_topics: Vec<Vec<f64>>,
    /// Per topic: top terms, strongest first.
    pub topic_terms: Vec<Vec<String>>,
}

impl FittedTopics {
    /// Dominant topic of one document and its probability.
    pub fn dominant_topic(&self, doc: usize) -> (usize, f64) {
        let dist = &self.doc_topics[doc];
        let mut best = 0;
        for (k, &p) in dist.iter().enumerate() {
            if p > dist[best] {
                best = k;
            }
        }
        (best, dist[best])
    }
}

/// Fit the topic model. Returns None when the vocabulary is empty
/// (degenerate corpus) — callers skip the topic stage in that case.
pub fn fit(matrix: &DocTermMatrix, settings: &TopicModelSettings) -> Option<FittedTopics> {
    let n_topics = settings.n_topics;
    let n_terms = matrix.vocabulary.len();
    if n_terms == 0 || n_topics == 0 {
        return None;
    }

    // Expand the sparse counts into one token instance per occurrence.
    let docs: Vec<Vec<usize>> = matrix
        .docs
        .iter()
        .map(|entries| {
            let mut tokens = Vec::new();
            for &(term, count) in entries {
                for _ in 0..count {
                    tokens.push(term);
                }
            }
            tokens
        })
        .collect();

    let mut rng = StdRng::seed_from_u64(settings.seed);

    // Topic assignment per token plus the three count tables the
    // sampler maintains.
    let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(docs.len());
    let mut doc_topic = vec![vec![0u32; n_topics]; docs.len()];
    let mut topic_term = vec![vec![0u32; n_terms]; n_topics];
    let mut topic_total = vec![0u32; n_topics];

    for (d, tokens) in docs.iter().enumerate() {
        let mut z = Vec::with_capacity(tokens.len());
        for &term in tokens {
            let k = rng.random_range(0..n_topics);
            z.push(k);
            doc_topic[d][k] += 1;
            topic_term[k][term] += 1;
            topic_total[k] += 1;
        }
        assignments.push(z);
    }

    let v_beta = n_terms as f64 * BETA;
    let mut weights = vec![0.0f64; n_topics];

    for _sweep in 0..settings.sweeps {
        for (d, tokens) in docs.iter().enumerate() {
            for (i, &term) in tokens.iter().enumerate() {
                let old = assignments[d][i];
                doc_topic[d][old] -= 1;
                topic_term[old][term] -= 1;
                topic_total[old] -= 1;

                let mut total = 0.0;
                for k in 0..n_topics {
                    let w = (f64::from(doc_topic[d][k]) + ALPHA)
                        * (f64::from(topic_term[k][term]) + BETA)
                        / (f64::from(topic_total[k]) + v_beta);
                    weights[k] = w;
                    total += w;
                }

                let mut target = rng.random::<f64>() * total;
                let mut new = n_topics - 1;
                for (k, &w) in weights.iter().enumerate() {
                    target -= w;
                    if target <= 0.0 {
                        new = k;
                        break;
                    }
                }

                assignments[d][i] = new;
                doc_topic[d][new] += 1;
                topic_term[new][term] += 1;
                topic_total[new] += 1;
            }
        }
    }

    // Smoothed per-document topic distributions.
    let doc_topics = docs
        .iter()
        .enumerate()
        .map(|(d, tokens)| {
            let denom = tokens.len() as f64 + n_topics as f64 * ALPHA;
            (0..n_topics)
                .map(|k| (f64::from(doc_topic[d][k]) + ALPHA) / denom)
                .collect()
        })
        .collect();

    // Top terms per topic; count-descending, lexicographic tie-break.
    let topic_terms = topic_term
        .iter()
        .map(|counts| {
            let mut terms: Vec<(usize, u32)> = counts
                .iter()
                .enumerate()
                .filter(|(_, &c)| c > 0)
                .map(|(t, &c)| (t, c))
                .collect();
            terms.sort_by(|a, b| {
                b.1.cmp(&a.1)
                    .then_with(|| matrix.vocabulary[a.0].cmp(&matrix.vocabulary[b.0]))
            });
            terms
                .into_iter()
                .take(TOP_TERMS)
                .map(|(t, _)| matrix.vocabulary[t].clone())
                .collect()
        })
        .collect();

    Some(FittedTopics {
        doc_topics,
        topic_terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::text::{vectorize, VectorizerParams};

    fn settings(n_topics: usize) -> TopicModelSettings {
        TopicModelSettings {
            n_topics,
            max_features: 1000,
            min_doc_freq: 2,
            sweeps: 10,
            seed: 42,
        }
    }

    fn corpus() -> Vec<String> {
        vec![
            "flood river delta flood".to_string(),
            "flood river bank".to_string(),
            "earthquake fault tremor".to_string(),
            "earthquake tremor aftershock".to_string(),
            "flood delta monsoon".to_string(),
            "earthquake fault aftershock".to_string(),
        ]
    }

    #[test]
    fn test_fit_returns_none_on_empty_vocabulary() {
        let matrix = vectorize(
            &["solo".to_string()],
            &VectorizerParams {
                max_features: 1000,
                min_doc_freq: 2,
            },
        );
        assert!(matrix.vocabulary.is_empty());
        assert!(fit(&matrix, &settings(8)).is_none());
    }

    #[test]
    fn test_distributions_are_probabilities() {
        let texts = corpus();
        let matrix = vectorize(
            &texts,
            &VectorizerParams {
                max_features: 1000,
                min_doc_freq: 2,
            },
        );
        let fitted = fit(&matrix, &settings(4)).unwrap();

        assert_eq!(fitted.doc_topics.len(), texts.len());
        for dist in &fitted.doc_topics {
            assert_eq!(dist.len(), 4);
            let sum: f64 = dist.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(dist.iter().all(|&p| p > 0.0 && p < 1.0));
        }

        for doc in 0..texts.len() {
            let (topic, confidence) = fitted.dominant_topic(doc);
            assert!(topic < 4);
            assert!(confidence > 0.0 && confidence <= 1.0);
        }
    }

    #[test]
    fn test_fit_is_deterministic_for_a_seed() {
        let texts = corpus();
        let matrix = vectorize(
            &texts,
            &VectorizerParams {
                max_features: 1000,
                min_doc_freq: 2,
            },
        );
        let a = fit(&matrix, &settings(4)).unwrap();
        let b = fit(&matrix, &settings(4)).unwrap();
        assert_eq!(a.doc_topics, b.doc_topics);
        assert_eq!(a.topic_terms, b.topic_terms);
    }

    #[test]
    fn test_topic_terms_bounded_and_from_vocabulary() {
        let texts = corpus();
        let matrix = vectorize(
            &texts,
            &VectorizerParams {
                max_features: 1000,
                min_doc_freq: 2,
            },
        );
        let fitted = fit(&matrix, &settings(4)).unwrap();
        assert_eq!(fitted.topic_terms.len(), 4);
        for terms in &fitted.topic_terms {
            assert!(terms.len() <= TOP_TERMS);
            for term in terms {
                assert!(matrix.vocabulary.contains(term));
            }
        }
    }
}
