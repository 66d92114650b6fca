//! Inverted index and its builder.
//!
//! Building and querying are two separate types: [`IndexBuilder`] is the only
//! thing that can mutate postings, and [`IndexBuilder::finish`] consumes it to
//! produce a sealed [`InvertedIndex`] that only hands out shared references.

use crate::tokenizer::Analyzer;
use crate::{DocId, Document, Posting, TermId};
use std::collections::{BTreeMap, HashMap};

/// Postings for one term, ordered by ascending doc_id.
pub type PostingsList = Vec<Posting>;

#[derive(Debug, Default)]
pub struct IndexBuilder {
    analyzer: Analyzer,
    dictionary: BTreeMap<String, TermId>,
    postings: Vec<PostingsList>,
    docs: Vec<Document>,
    total_terms: u64,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn with_analyzer(analyzer: Analyzer) -> Self {
        Self { analyzer, ..Self::default() }
    }

    /// Tokenize `text` and append it as the next document. Doc ids start at 0.
    ///
    /// External ids are stored verbatim; duplicates are accepted.
    pub fn add_document(&mut self, external_id: &str, text: &str) -> DocId {
        let doc_id = self.docs.len() as DocId;

        // Count term frequencies, remembering first-occurrence order
        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        let mut order: Vec<TermId> = Vec::new();
        let mut length = 0u32;
        for term in self.analyzer.tokens(text) {
            length += 1;
            let tid = match self.dictionary.get(&term) {
                Some(&tid) => tid,
                None => {
                    let tid = self.postings.len() as TermId;
                    self.dictionary.insert(term, tid);
                    self.postings.push(Vec::new());
                    tid
                }
            };
            let tf = tf_counts.entry(tid).or_insert(0);
            if *tf == 0 { order.push(tid); }
            *tf += 1;
        }

        for tid in order {
            let term_frequency = tf_counts[&tid];
            self.postings[tid as usize].push(Posting { doc_id, term_frequency });
        }

        self.total_terms += u64::from(length);
        self.docs.push(Document {
            doc_id,
            external_id: external_id.to_string(),
            length,
            message: text.to_string(),
        });
        doc_id
    }

    pub fn document_count(&self) -> usize { self.docs.len() }

    /// Seal the index. No further documents can be added.
    pub fn finish(self) -> InvertedIndex {
        tracing::info!(num_docs = self.docs.len(), num_terms = self.dictionary.len(), "index sealed");
        InvertedIndex {
            analyzer: self.analyzer,
            dictionary: self.dictionary,
            postings: self.postings,
            docs: self.docs,
            total_terms: self.total_terms,
        }
    }
}

/// Sealed, read-only inverted index. Safe to share across threads.
#[derive(Debug)]
pub struct InvertedIndex {
    analyzer: Analyzer,
    dictionary: BTreeMap<String, TermId>,
    postings: Vec<PostingsList>,
    docs: Vec<Document>,
    total_terms: u64,
}

impl InvertedIndex {
    /// Build an index from `(external_id, text)` pairs in one go.
    pub fn from_documents<'a, I>(analyzer: Analyzer, docs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut builder = IndexBuilder::with_analyzer(analyzer);
        for (external_id, text) in docs {
            builder.add_document(external_id, text);
        }
        builder.finish()
    }

    /// The analyzer documents were indexed with; queries must use the same one.
    pub fn analyzer(&self) -> Analyzer { self.analyzer }

    pub fn term_id(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    /// Postings for `term`, empty if the term is not in the vocabulary.
    pub fn postings_for(&self, term: &str) -> &[Posting] {
        self.term_id(term).map(|tid| self.postings_by_id(tid)).unwrap_or(&[])
    }

    pub fn postings_by_id(&self, term_id: TermId) -> &[Posting] {
        self.postings.get(term_id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.docs.get(doc_id as usize) }

    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ { self.docs.iter() }

    pub fn document_count(&self) -> usize { self.docs.len() }

    /// Number of documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> usize { self.postings_for(term).len() }

    /// Sum of the term frequencies of `term` across all documents.
    pub fn total_terms_for(&self, term: &str) -> u64 {
        self.postings_for(term).iter().map(|p| u64::from(p.term_frequency)).sum()
    }

    /// Sum of all document lengths.
    pub fn total_terms(&self) -> u64 { self.total_terms }

    pub fn average_document_length(&self) -> f64 {
        if self.docs.is_empty() {
            return 0.0;
        }
        self.total_terms as f64 / self.docs.len() as f64
    }

    pub fn vocabulary_size(&self) -> usize { self.dictionary.len() }

    /// Vocabulary in lexicographic order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ { self.dictionary.keys().map(String::as_str) }
}
