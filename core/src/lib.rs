//! In-memory retrieval core for short-text (microblog) collections.
//!
//! Documents are ingested through an [`index::IndexBuilder`], sealed into a
//! read-only [`index::InvertedIndex`], and queried with
//! [`query::QueryEvaluator`] + [`rank::rank`].

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod report;
pub mod tokenizer;
pub mod topics;
pub mod vocab;

pub use error::{Error, Result};

pub type TermId = u32;
pub type DocId = u32;

/// Metadata kept for every ingested document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub doc_id: DocId,
    pub external_id: String,
    /// Number of terms after normalization and stopword removal.
    pub length: u32,
    /// Stored message text, for display only.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_frequency: u32,
}

/// A query as handed over by a query source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub query_id: String,
    pub raw_text: String,
}

impl Query {
    pub fn new(query_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self { query_id: query_id.into(), raw_text: raw_text.into() }
    }
}

/// A candidate document with its raw relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredResult {
    pub doc_id: DocId,
    pub score: f64,
}
