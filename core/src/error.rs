use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{resource}:{line}: expected `<id>\\t<message>`, found {found:?}")]
    IngestionFormat { resource: String, line: usize, found: String },

    #[error("cannot parse query {query:?}: {reason}")]
    QueryParse { query: String, reason: String },

    #[error("{resource}: malformed topics at byte {position}: {message}")]
    TopicsFormat { resource: String, position: u64, message: String },

    #[error("query has no searchable terms")]
    EmptyQuery,

    #[error("{op} {}: {source}", .resource.display())]
    Io {
        op: &'static str,
        resource: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(op: &'static str, resource: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io { op, resource: resource.as_ref().to_path_buf(), source }
    }

    /// True for failures that only affect a single query.
    pub fn is_query_error(&self) -> bool {
        matches!(self, Error::QueryParse { .. } | Error::EmptyQuery)
    }
}


pub type Result<T> = std::result::Result<T, Error>;
