use thiserror::Error;

/// Errors surfaced by the trainer outside of the scoring hot path.
///
/// Scoring, stats and session transitions are total and never produce one of
/// these; they show up when building a session or talking to collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// The sample corpus has no usable sentences.
    #[error("corpus contains no sentences")]
    EmptyCorpus,

    #[error("corpus file {0} not found")]
    MissingCorpus(String),

    #[error("invalid corpus file: {0}")]
    CorpusFormat(#[from] serde_json::Error),

    /// Time or word limit of zero.
    #[error("session length must be a positive number")]
    InvalidLength,

    #[error("generated target text is empty")]
    EmptyTarget,

    #[error("history store error: {0}")]
    History(#[from] rusqlite::Error),

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
