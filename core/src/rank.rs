//! TF-IDF scoring and deterministic top-k selection.

use crate::config::IdfMode;
use crate::index::InvertedIndex;
use crate::query::Candidates;
use crate::{DocId, ScoredResult};
use std::cmp::Ordering;

/// A scored result with its 1-based rank and score relative to the best hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult {
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f64,
    /// `score / max_score`, rounded half-up to three decimals.
    pub normalized_score: f64,
}

pub fn idf(mode: IdfMode, num_docs: usize, doc_freq: usize) -> f64 {
    if doc_freq == 0 {
        return 0.0;
    }
    let ratio = num_docs as f64 / doc_freq as f64;
    match mode {
        IdfMode::Plain => ratio.ln(),
        IdfMode::Smoothed => (1.0 + ratio).ln(),
    }
}

/// Sublinear frequency weight, `1 + ln(tf)`; zero when the term is absent.
pub fn tf_weight(tf: u32) -> f64 {
    if tf == 0 { 0.0 } else { 1.0 + f64::from(tf).ln() }
}

/// Round half-up to three decimals.
pub fn round3(x: f64) -> f64 { (x * 1000.0 + 0.5).floor() / 1000.0 }

/// Descending score, then ascending doc_id.
fn by_relevance(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    pub idf: IdfMode,
}

impl Ranker {
    pub fn new(idf: IdfMode) -> Self { Self { idf } }

    /// Raw scores for every candidate, in doc_id order.
    pub fn score(&self, candidates: &Candidates, index: &InvertedIndex) -> Vec<ScoredResult> {
        let n = index.document_count();
        // Per query term: idf(t) * (1 + ln qtf)
        let term_weights: Vec<f64> = candidates
            .terms
            .iter()
            .map(|qt| match qt.term_id {
                Some(tid) => idf(self.idf, n, index.postings_by_id(tid).len()) * tf_weight(qt.query_frequency),
                None => 0.0,
            })
            .collect();

        candidates
            .matches
            .iter()
            .map(|(&doc_id, matches)| {
                let score = matches
                    .iter()
                    .map(|m| tf_weight(m.term_frequency) * term_weights[m.term_index])
                    .sum();
                ScoredResult { doc_id, score }
            })
            .collect()
    }

    /// Top `k` candidates by descending score with ranks assigned after tie-breaking.
    pub fn rank(&self, candidates: &Candidates, index: &InvertedIndex, k: usize) -> Vec<RankedResult> {
        let mut scored = self.score(candidates, index);
        let max_score = scored.iter().map(|s| s.score).fold(0.0f64, f64::max);

        if k < scored.len() {
            scored.select_nth_unstable_by(k, by_relevance);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_relevance);

        scored
            .into_iter()
            .enumerate()
            .map(|(i, s)| RankedResult {
                rank: i + 1,
                doc_id: s.doc_id,
                score: s.score,
                normalized_score: if max_score > 0.0 { round3(s.score / max_score) } else { 1.0 },
            })
            .collect()
    }
}
