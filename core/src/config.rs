//! Run settings.
//!
//! Uses Figment to merge built-in defaults, an optional `mbir.toml` and
//! `MBIR_*` environment variables. Binaries apply their CLI flags on top.

use crate::error::{Error, Result};
use crate::tokenizer::Analyzer;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "mbir.toml";

/// Inverse document frequency flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfMode {
    /// `ln(N / df)`; zero for terms present in every document.
    Plain,
    /// `ln(1 + N / df)`; always positive.
    #[default]
    Smoothed,
}

/// What goes into the first column of a report line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIdMode {
    /// The id carried by the query record itself.
    Topic,
    /// 1-based position of the query in its source.
    #[default]
    Ordinal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub top_k: usize,
    pub run_tag: String,
    pub query_ids: QueryIdMode,
    pub stem: bool,
    pub idf: IdfMode,
    pub max_query_terms: usize,
    pub vocab_sample: usize,
    pub skip_malformed: bool,
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_k: 1000,
            run_tag: "myRun".to_string(),
            query_ids: QueryIdMode::Ordinal,
            stem: false,
            idf: IdfMode::Smoothed,
            max_query_terms: 1024,
            vocab_sample: 100,
            skip_malformed: false,
            parallel: false,
        }
    }
}

impl Settings {
    /// Defaults, then `mbir.toml` in the working directory, then `MBIR_*` env vars.
    pub fn load() -> Result<Self> { Self::merge_file(Path::new(DEFAULT_CONFIG_FILE)) }

    /// Like [`Settings::load`] with an explicit settings file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::io("open settings", path, std::io::ErrorKind::NotFound.into()));
        }
        Self::merge_file(path)
    }

    fn merge_file(path: &Path) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("MBIR_"));
        let settings: Settings = figment.extract().map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".into()));
        }
        if self.max_query_terms == 0 {
            return Err(Error::Config("max_query_terms must be at least 1".into()));
        }
        if self.run_tag.trim().is_empty() || self.run_tag.contains(char::is_whitespace) {
            return Err(Error::Config(format!("run_tag must be a single non-empty word, got {:?}", self.run_tag)));
        }
        Ok(())
    }

    pub fn analyzer(&self) -> Analyzer { Analyzer::new(self.stem) }
}
