//! End-to-end helpers: build from files, search, batch-evaluate and report.

use crate::config::{IdfMode, QueryIdMode, Settings};
use crate::corpus::{corpus_files, ingest, CorpusReader};
use crate::error::{Error, Result};
use crate::index::{IndexBuilder, InvertedIndex};
use crate::query::QueryEvaluator;
use crate::rank::{RankedResult, Ranker};
use crate::report::{ReportLine, ReportWriter};
use crate::Query;
use rayon::prelude::*;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Build and seal an index from a corpus file or directory.
pub fn build_index(corpus: &Path, settings: &Settings) -> Result<InvertedIndex> {
    let mut builder = IndexBuilder::with_analyzer(settings.analyzer());
    for file in corpus_files(corpus)? {
        let reader = CorpusReader::open(&file)?.skip_malformed(settings.skip_malformed);
        let added = ingest(&mut builder, reader)?;
        tracing::info!(file = %file.display(), docs = added, "ingested corpus file");
    }
    Ok(builder.finish())
}

/// Evaluate and rank one query. A query with no searchable terms yields no results.
pub fn search(index: &InvertedIndex, text: &str, k: usize, idf: IdfMode, max_terms: usize) -> Result<Vec<RankedResult>> {
    match QueryEvaluator::new(index).with_max_terms(max_terms).evaluate(text) {
        Ok(candidates) => Ok(Ranker::new(idf).rank(&candidates, index, k)),
        Err(Error::EmptyQuery) => {
            tracing::debug!(query = text, "query has only stopwords");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug)]
pub struct QueryOutcome {
    /// 1-based position of the query in the input.
    pub ordinal: usize,
    pub query: Query,
    pub results: Result<Vec<RankedResult>>,
}

impl QueryOutcome {
    pub fn report_id(&self, mode: QueryIdMode) -> String {
        match mode {
            QueryIdMode::Topic => self.query.query_id.clone(),
            QueryIdMode::Ordinal => self.ordinal.to_string(),
        }
    }
}

fn evaluate_one(index: &InvertedIndex, ordinal: usize, query: &Query, settings: &Settings) -> QueryOutcome {
    let results = search(index, &query.raw_text, settings.top_k, settings.idf, settings.max_query_terms);
    match &results {
        Ok(hits) => tracing::debug!(query_id = %query.query_id, hits = hits.len(), "ranked query"),
        Err(e) if e.is_query_error() => tracing::warn!(query_id = %query.query_id, error = %e, "query rejected"),
        Err(e) => tracing::error!(query_id = %query.query_id, error = %e, "query failed"),
    }
    QueryOutcome { ordinal, query: query.clone(), results }
}

/// Evaluate every query against the sealed index. Outcomes come back in input order
/// whether or not `settings.parallel` is set.
pub fn run_queries(index: &InvertedIndex, queries: &[Query], settings: &Settings) -> Vec<QueryOutcome> {
    let outcomes: Vec<QueryOutcome> = if settings.parallel {
        queries
            .par_iter()
            .enumerate()
            .map(|(i, q)| evaluate_one(index, i + 1, q, settings))
            .collect()
    } else {
        queries
            .iter()
            .enumerate()
            .map(|(i, q)| evaluate_one(index, i + 1, q, settings))
            .collect()
    };
    let failed = outcomes.iter().filter(|o| o.results.is_err()).count();
    tracing::info!(queries = outcomes.len(), failed, "evaluated queries");
    outcomes
}

/// Write one run line per ranked result. Failed queries contribute no lines.
pub fn write_report<W: Write>(
    index: &InvertedIndex,
    outcomes: &[QueryOutcome],
    settings: &Settings,
    out: &mut ReportWriter<W>,
) -> Result<usize> {
    let before = out.lines_written();
    for outcome in outcomes {
        let Ok(results) = &outcome.results else { continue };
        let query_id = outcome.report_id(settings.query_ids);
        for r in results {
            let Some(doc) = index.document(r.doc_id) else { continue };
            out.write_line(ReportLine {
                query_id: &query_id,
                external_id: &doc.external_id,
                rank: r.rank,
                normalized_score: r.normalized_score,
                run_tag: &settings.run_tag,
            })?;
        }
    }
    Ok(out.lines_written() - before)
}

/// Console table of ranked results: normalized score, external id and message.
pub fn preview(index: &InvertedIndex, results: &[RankedResult]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Score\tTweet ID\t\tMessage");
    let _ = writeln!(s, "{}", "-".repeat(82));
    for r in results {
        if let Some(doc) = index.document(r.doc_id) {
            let _ = writeln!(s, "{:.3}\t{}\t{}", r.normalized_score, doc.external_id, doc.message);
        }
    }
    s
}
