//! Disjunctive query evaluation against a sealed index.

use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::{DocId, TermId};
use std::collections::{BTreeMap, HashMap};

/// Clause limit of the query parser.
pub const DEFAULT_MAX_QUERY_TERMS: usize = 1024;

/// A distinct normalized query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub term: String,
    /// `None` when the term is not in the index vocabulary.
    pub term_id: Option<TermId>,
    /// Occurrences of the term in the query text.
    pub query_frequency: u32,
}

/// One query term found in a candidate document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermMatch {
    /// Position of the term in [`Candidates::terms`].
    pub term_index: usize,
    pub term_frequency: u32,
}

/// Every document containing at least one query term, with per-term match data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    /// Distinct query terms in first-occurrence order.
    pub terms: Vec<QueryTerm>,
    /// Matches per candidate; each list follows the order of `terms`.
    pub matches: BTreeMap<DocId, Vec<TermMatch>>,
}

impl Candidates {
    pub fn len(&self) -> usize { self.matches.len() }

    pub fn is_empty(&self) -> bool { self.matches.is_empty() }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ { self.matches.keys().copied() }
}

pub struct QueryEvaluator<'a> {
    index: &'a InvertedIndex,
    max_terms: usize,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index, max_terms: DEFAULT_MAX_QUERY_TERMS }
    }

    pub fn with_max_terms(mut self, max_terms: usize) -> Self {
        self.max_terms = max_terms;
        self
    }

    /// Normalize `text` with the index's analyzer into distinct query terms.
    ///
    /// Blank text and oversized queries are parse errors; text that normalizes
    /// to nothing (only stopwords or punctuation) is [`Error::EmptyQuery`].
    pub fn parse(&self, text: &str) -> Result<Vec<QueryTerm>> {
        if text.trim().is_empty() {
            return Err(Error::QueryParse { query: text.to_string(), reason: "query is blank".into() });
        }

        let mut terms: Vec<QueryTerm> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        for term in self.index.analyzer().tokens(text) {
            match positions.get(&term) {
                Some(&i) => terms[i].query_frequency += 1,
                None => {
                    if terms.len() == self.max_terms {
                        return Err(Error::QueryParse {
                            query: text.to_string(),
                            reason: format!("more than {} distinct terms", self.max_terms),
                        });
                    }
                    positions.insert(term.clone(), terms.len());
                    let term_id = self.index.term_id(&term);
                    terms.push(QueryTerm { term, term_id, query_frequency: 1 });
                }
            }
        }

        if terms.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(terms)
    }

    /// Union of the postings of all query terms.
    pub fn evaluate(&self, text: &str) -> Result<Candidates> {
        let terms = self.parse(text)?;
        let mut matches: BTreeMap<DocId, Vec<TermMatch>> = BTreeMap::new();
        for (term_index, qt) in terms.iter().enumerate() {
            let Some(tid) = qt.term_id else { continue };
            for p in self.index.postings_by_id(tid) {
                matches
                    .entry(p.doc_id)
                    .or_default()
                    .push(TermMatch { term_index, term_frequency: p.term_frequency });
            }
        }
        tracing::debug!(query = text, terms = terms.len(), candidates = matches.len(), "evaluated query");
        Ok(Candidates { terms, matches })
    }
}
