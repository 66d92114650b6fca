use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mbir_core::config::{IdfMode, QueryIdMode, Settings};
use mbir_core::pipeline::{build_index, preview, run_queries, search, write_report};
use mbir_core::report::ReportWriter;
use mbir_core::topics::read_topics;
use mbir_core::vocab::VocabularySample;
use mbir_core::Query;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mbir")]
#[command(about = "Index a microblog corpus and produce TREC run files", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./mbir.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Stem terms with the English Snowball stemmer
    #[arg(long, global = true)]
    stem: bool,
    /// IDF flavour
    #[arg(long, global = true, value_enum)]
    idf: Option<IdfArg>,
    /// Skip corpus lines without a TAB instead of aborting
    #[arg(long, global = true)]
    skip_malformed: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum IdfArg {
    Plain,
    Smoothed,
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryIdArg {
    Topic,
    Ordinal,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the corpus, evaluate every topic and write the run file
    Run {
        /// Corpus file or directory of `<id>\t<message>` lines
        #[arg(long)]
        corpus: PathBuf,
        /// Topics file
        #[arg(long)]
        topics: PathBuf,
        /// Output run file
        #[arg(long, default_value = "output/Results.txt")]
        results: PathBuf,
        /// Also write a vocabulary sample to this file
        #[arg(long)]
        vocab: Option<PathBuf>,
        /// Results per query
        #[arg(long)]
        top_k: Option<usize>,
        /// Run tag written in the last column
        #[arg(long)]
        run_tag: Option<String>,
        /// First-column query id
        #[arg(long, value_enum)]
        query_ids: Option<QueryIdArg>,
        /// Evaluate queries on a worker pool
        #[arg(long)]
        parallel: bool,
    },
    /// Print the best matches for an ad hoc query
    Search {
        #[arg(long)]
        corpus: PathBuf,
        /// Number of hits to print
        #[arg(long, default_value_t = 10)]
        hits: usize,
        query: String,
    },
    /// Write the vocabulary size and a sample of terms
    Vocab {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long, default_value = "output/SampleVocab.txt")]
        output: PathBuf,
        /// Number of terms to sample
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Run { corpus, topics, results, vocab, top_k, run_tag, query_ids, parallel } => {
            let mut settings = settings;
            if let Some(k) = top_k { settings.top_k = k; }
            if let Some(tag) = run_tag { settings.run_tag = tag; }
            if let Some(mode) = query_ids {
                settings.query_ids = match mode {
                    QueryIdArg::Topic => QueryIdMode::Topic,
                    QueryIdArg::Ordinal => QueryIdMode::Ordinal,
                };
            }
            settings.parallel |= parallel;
            settings.validate().context("invalid run options")?;
            run(&corpus, &topics, &results, vocab.as_deref(), &settings)
        }
        Commands::Search { corpus, hits, query } => {
            let index = build_index(&corpus, &settings)
                .with_context(|| format!("building index from {}", corpus.display()))?;
            let results = search(&index, &query, hits, settings.idf, settings.max_query_terms)
                .with_context(|| format!("searching for {query:?}"))?;
            print!("{}", preview(&index, &results));
            Ok(())
        }
        Commands::Vocab { corpus, output, limit } => {
            let index = build_index(&corpus, &settings)
                .with_context(|| format!("building index from {}", corpus.display()))?;
            write_vocab(&index, &output, limit.unwrap_or(settings.vocab_sample))
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load().context("loading settings")?,
    };
    settings.stem |= cli.stem;
    settings.skip_malformed |= cli.skip_malformed;
    if let Some(idf) = cli.idf {
        settings.idf = match idf {
            IdfArg::Plain => IdfMode::Plain,
            IdfArg::Smoothed => IdfMode::Smoothed,
        };
    }
    Ok(settings)
}

fn run(corpus: &Path, topics: &Path, results: &Path, vocab: Option<&Path>, settings: &Settings) -> Result<()> {
    let index = build_index(corpus, settings)
        .with_context(|| format!("building index from {}", corpus.display()))?;
    tracing::info!(num_docs = index.document_count(), num_terms = index.vocabulary_size(), "index ready");

    let queries: Vec<Query> = read_topics(topics)
        .with_context(|| format!("reading topics from {}", topics.display()))?
        .iter()
        .map(|t| t.to_query())
        .collect();
    let outcomes = run_queries(&index, &queries, settings);

    let mut writer = ReportWriter::create(results)
        .with_context(|| format!("opening results file {}", results.display()))?;
    let lines = write_report(&index, &outcomes, settings, &mut writer)
        .with_context(|| format!("writing results to {}", results.display()))?;
    writer.finish().with_context(|| format!("closing {}", results.display()))?;
    tracing::info!(results = %results.display(), lines, "run file written");

    if let Some(vocab) = vocab {
        write_vocab(&index, vocab, settings.vocab_sample)?;
    }
    Ok(())
}

fn write_vocab(index: &mbir_core::index::InvertedIndex, output: &Path, limit: usize) -> Result<()> {
    let sample = VocabularySample::from_index(index, limit);
    let mut writer = ReportWriter::create(output)
        .with_context(|| format!("opening vocabulary file {}", output.display()))?;
    sample.write_to(&mut writer).with_context(|| format!("writing {}", output.display()))?;
    writer.finish().with_context(|| format!("closing {}", output.display()))?;
    tracing::info!(output = %output.display(), terms = sample.terms.len(), total = sample.total_terms, "vocabulary sample written");
    Ok(())
}
