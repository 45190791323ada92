use thiserror::Error;

/// Fatal errors of the ingestion pipeline.
///
/// Row-level problems (malformed structure, unparseable amounts, unknown
/// state codes) are *data*, not errors: they are quarantined or flagged and
/// show up in the diagnostics, never as an `Err` from the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source file unavailable: {path}: {source}")]
    SourceUnavailable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("required column {0} missing from header")]
    MissingColumn(String),

    #[error("finalize called before the input stream was exhausted")]
    PrematureFinalize,

    #[error("finalize called twice on the same aggregator")]
    AlreadyFinalized,
}
