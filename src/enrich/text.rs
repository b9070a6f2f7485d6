//! Corpus construction and bag-of-words vectorization.
//!
//! Each record becomes one lower-cased text document; the vectorizer
//! builds a unigram+bigram vocabulary with stopword removal, a minimum
//! document frequency, and a size cap, then produces sparse term
//! counts per document.

use std::collections::HashMap;

use crate::models::DisasterRecord;

/// Sentinel document so topic modeling never sees an empty text.
pub const FALLBACK_DOCUMENT: &str = "unknown disaster";

/// Common English stopwords excluded from the vocabulary.
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "being", "below", "between", "both", "but", "by",
    "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "you",
    "your", "yours",
];

/// Build the text document for one record: actors, location name,
/// disaster type, and keywords, lower-cased, skipping empty parts.
pub fn record_document(record: &DisasterRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    let fields = [
        record.actor1.as_deref(),
        record.actor2.as_deref(),
        record.location_name.as_deref(),
        Some(record.disaster_type.as_str()),
    ];
    for field in fields.into_iter().flatten() {
        let trimmed = field.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_lowercase());
        }
    }
    for keyword in &record.keywords {
        let trimmed = keyword.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed.to_lowercase());
        }
    }

    join_or_fallback(&parts)
}

/// Join text parts, falling back to the sentinel for an empty document.
fn join_or_fallback(parts: &[String]) -> String {
    if parts.is_empty() {
        FALLBACK_DOCUMENT.to_string()
    } else {
        parts.join(" ")
    }
}

/// Word tokens: runs of at least two alphanumeric characters, stopwords
/// removed, followed by the bigrams of the surviving sequence.
fn tokenize(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.retain(|w| w.chars().count() >= 2 && !STOPWORDS.contains(&w.as_str()));

    let mut tokens = words.clone();
    for pair in words.windows(2) {
        tokens.push(format!("{} {}", pair[0], pair[1]));
    }
    tokens
}

#[derive(Debug, Clone)]
pub struct VectorizerParams {
    /// Vocabulary cap, by total corpus frequency.
    pub max_features: usize,
    /// A term must appear in at least this many documents.
    pub min_doc_freq: usize,
}

/// Sparse document-term counts over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct DocTermMatrix {
    /// Vocabulary terms, lexicographically ordered.
    pub vocabulary: Vec<String>,
    /// Per document: (term index, count), ordered by term index.
    pub docs: Vec<Vec<(usize, u32)>>,
}

/// Build the document-term matrix for a corpus.
pub fn vectorize(texts: &[String], params: &VectorizerParams) -> DocTermMatrix {
    // Raw counts per document
    let mut doc_counts: Vec<HashMap<String, u32>> = Vec::with_capacity(texts.len());
    for text in texts {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        doc_counts.push(counts);
    }

    // Document and corpus frequencies
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    let mut corpus_freq: HashMap<&str, u64> = HashMap::new();
    for counts in &doc_counts {
        for (term, &count) in counts {
            *doc_freq.entry(term).or_insert(0) += 1;
            *corpus_freq.entry(term).or_insert(0) += u64::from(count);
        }
    }

    // Terms meeting the document-frequency floor
    let mut candidates: Vec<(&str, u64)> = doc_freq
        .iter()
        .filter(|(_, &df)| df >= params.min_doc_freq)
        .map(|(&term, _)| (term, corpus_freq[term]))
        .collect();

    // Cap by total frequency, lexicographic tie-break for determinism
    if candidates.len() > params.max_features {
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(params.max_features);
    }

    let mut vocabulary: Vec<String> = candidates
        .into_iter()
        .map(|(term, _)| term.to_string())
        .collect();
    vocabulary.sort();

    let index: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, term)| (term.as_str(), i))
        .collect();

    let docs = doc_counts
        .iter()
        .map(|counts| {
            let mut entries: Vec<(usize, u32)> = counts
                .iter()
                .filter_map(|(term, &count)| index.get(term.as_str()).map(|&i| (i, count)))
                .collect();
            entries.sort_by_key(|&(i, _)| i);
            entries
        })
        .collect();

    DocTermMatrix { vocabulary, docs }
}
