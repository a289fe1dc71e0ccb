//! Relevance scoring: token overlap weighted by term rarity.
//!
//! Each corpus entry is scored against a tokenized query in two parts:
//!
//! 1. A Jaccard-style **base score**: matching query tokens over the size of
//!    the union of the entry's term set and the query's term set.
//! 2. An **idf multiplier**: every matching query token adds
//!    `ln(total_docs / df(term))`, damped by 10 and applied as `1 + idf / 10`.
//!
//! The product is capped at 1, so scores always lie in `[0, 1]`. Matches on
//! rare terms lift an entry above one that only shares common vocabulary, but
//! no single term can push a weak overlap past the cap.
//!
//! Scoring is pure and deterministic: the same query and corpus always produce
//! the same ranking.

use std::collections::{HashMap, HashSet};

use corpus_index::{CorpusEntry, document_frequency};

/// Entries scoring at or below this are dropped from the ranking.
pub const MIN_SCORE: f64 = 0.05;

/// Maximum number of ranked entries returned.
pub const MAX_RESULTS: usize = 15;

/// Damping divisor applied to the summed idf weight.
const IDF_DAMPING: f64 = 10.0;

/// A corpus entry paired with its relevance to one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntry<'a> {
    pub entry: &'a CorpusEntry,
    pub score: f64,
}

/// Rank corpus entries against a tokenized query.
///
/// Returns at most [`MAX_RESULTS`] entries scoring above [`MIN_SCORE`], sorted
/// by descending score. Ties keep corpus order.
pub fn rank<'a>(query: &[String], entries: &'a [CorpusEntry]) -> Vec<ScoredEntry<'a>> {
    if query.is_empty() || entries.is_empty() {
        return Vec::new();
    }

    let df = document_frequency(entries);
    let total_docs = entries.len();

    let mut scored: Vec<ScoredEntry<'a>> = entries
        .iter()
        .map(|entry| ScoredEntry {
            entry,
            score: score_entry(query, entry, &df, total_docs),
        })
        .filter(|s| s.score > MIN_SCORE)
        .collect();

    // `sort_by` is stable, so equal scores stay in corpus order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(MAX_RESULTS);
    scored
}

/// Score a single entry against a query.
///
/// `df` is the document frequency table for the whole corpus and `total_docs`
/// its entry count. Unknown terms are treated as appearing in one document.
pub fn score_entry(
    query: &[String],
    entry: &CorpusEntry,
    df: &HashMap<&str, usize>,
    total_docs: usize,
) -> f64 {
    let entry_terms: HashSet<&str> = entry.tokens().iter().map(String::as_str).collect();
    let query_terms: HashSet<&str> = query.iter().map(String::as_str).collect();

    let union = entry_terms.union(&query_terms).count();
    if union == 0 {
        return 0.0;
    }

    // Duplicated query tokens each count as a separate match.
    let mut overlap = 0usize;
    let mut idf_weight = 0.0;
    for term in query {
        if entry_terms.contains(term.as_str()) {
            overlap += 1;
            let freq = df.get(term.as_str()).copied().unwrap_or(1).max(1);
            idf_weight += (total_docs as f64 / freq as f64).ln();
        }
    }

    if overlap == 0 {
        return 0.0;
    }

    let base = overlap as f64 / union as f64;
    (base * (1.0 + idf_weight / IDF_DAMPING)).min(1.0)
}
