use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use mbir_core::config::Settings;
use mbir_core::index::InvertedIndex;
use mbir_core::pipeline::build_index;
use mbir_core::query::QueryEvaluator;
use mbir_core::rank::Ranker;
use mbir_core::{DocId, Error};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub doc_id: DocId,
    pub external_id: String,
    pub score: f64,
    pub normalized_score: f64,
    pub snippet: String,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc_id: DocId,
    pub external_id: String,
    pub length: u32,
    pub message: String,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub settings: Arc<Settings>,
}

/// Build the index from `corpus` and serve it read-only.
pub fn build_app(corpus: &std::path::Path, settings: Settings) -> Result<Router> {
    let index = build_index(corpus, &settings).with_context(|| format!("building index from {}", corpus.display()))?;
    tracing::info!(num_docs = index.document_count(), num_terms = index.vocabulary_size(), "index loaded");
    router(Arc::new(index), settings)
}

/// Serve an already built index. Fails on settings that do not validate.
pub fn router(index: Arc<InvertedIndex>, settings: Settings) -> Result<Router> {
    settings.validate().context("invalid server settings")?;
    let app_state = AppState { index, settings: Arc::new(settings) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let index = &state.index;
    let settings = &state.settings;

    let candidates = match QueryEvaluator::new(index).with_max_terms(settings.max_query_terms).evaluate(&params.q) {
        Ok(c) => c,
        // Edge case: nothing left after stopword removal
        Err(Error::EmptyQuery) => {
            let elapsed = start.elapsed();
            return Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: 0, results: vec![] }));
        }
        Err(e) => return Err((StatusCode::BAD_REQUEST, e.to_string())),
    };

    let k = params.k.max(1).min(settings.top_k.max(1));
    let ranked = Ranker::new(settings.idf).rank(&candidates, index, k);
    let terms: Vec<&str> = candidates.terms.iter().map(|t| t.term.as_str()).collect();

    let results = ranked
        .into_iter()
        .filter_map(|r| {
            let doc = index.document(r.doc_id)?;
            Some(SearchHit {
                rank: r.rank,
                doc_id: r.doc_id,
                external_id: doc.external_id.clone(),
                score: r.score,
                normalized_score: r.normalized_score,
                snippet: highlight_terms(&doc.message, &terms, settings.stem),
            })
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: candidates.len(), results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<DocResponse>, StatusCode> {
    let doc = state.index.document(doc_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(DocResponse {
        doc_id: doc.doc_id,
        external_id: doc.external_id.clone(),
        length: doc.length,
        message: doc.message.clone(),
    }))
}

fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// HTML-escape `message` and wrap occurrences of the normalized query terms in `<em>`.
/// Stemmed terms match as word prefixes. Matching runs on the raw text so entities never match.
fn highlight_terms(message: &str, terms: &[&str], stemmed: bool) -> String {
    let mut out = String::with_capacity(message.len());
    let alternation = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    let pattern = if stemmed { format!(r"\b(?:{alternation})\w*") } else { format!(r"\b(?:{alternation})\b") };
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) if !terms.is_empty() => re,
        _ => {
            escape_html(message, &mut out);
            return out;
        }
    };
    let mut last = 0;
    for m in re.find_iter(message) {
        escape_html(&message[last..m.start()], &mut out);
        out.push_str("<em>");
        escape_html(m.as_str(), &mut out);
        out.push_str("</em>");
        last = m.end();
    }
    escape_html(&message[last..], &mut out);
    out
}
