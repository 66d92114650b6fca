use lazy_static::lazy_static;
use regex::{Matches, Regex};
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with",
        ];
        words.iter().copied().collect()
    };
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Text normalization shared by indexing and querying.
///
/// An index owns exactly one analyzer and hands it to every query evaluator,
/// so documents and queries always go through the same pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyzer {
    /// Apply English Snowball stemming after stopword removal.
    pub stem: bool,
}

impl Analyzer {
    pub fn new(stem: bool) -> Self { Self { stem } }

    /// Lazily tokenize `text`. Calling this again on the same text yields the same sequence.
    pub fn tokens<'a>(&self, text: &'a str) -> Tokens<'a> {
        let re: &'static Regex = &RE;
        Tokens { matches: re.find_iter(text), analyzer: *self }
    }

    pub fn analyze(&self, text: &str) -> Vec<String> { self.tokens(text).collect() }

    fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim_end_matches('\'');
        let term = trimmed.nfkc().collect::<String>().to_lowercase();
        if term.is_empty() || is_stopword(&term) { return None; }
        if self.stem {
            Some(STEMMER.stem(&term).into_owned())
        } else {
            Some(term)
        }
    }
}

/// Iterator over the normalized terms of one piece of text.
pub struct Tokens<'a> {
    matches: Matches<'static, 'a>,
    analyzer: Analyzer,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for mat in self.matches.by_ref() {
            if let Some(term) = self.analyzer.normalize(mat.as_str()) {
                return Some(term);
            }
        }
        None
    }
}

/// Tokenize with the default analyzer: NFKC, lowercase, stopword removal, no stemming.
pub fn tokenize(text: &str) -> Vec<String> { Analyzer::default().analyze(text) }
