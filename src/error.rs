use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading raw records and exporting topics.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single NDJSON line could not be decoded (malformed JSON or a missing field).
    #[error("record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CBOR error: {0}")]
    Cbor(#[from] serde_cbor::Error),

    #[error("record {id:?} has no parseable categories")]
    MalformedCategories { id: String },

    #[error("document id {0:?} appears more than once")]
    DuplicateDocId(String),

    /// The term index does not label this matrix: different width or different terms.
    #[error("vocabulary mismatch: matrix was fitted on {expected} terms, index has {found}")]
    VocabularyMismatch { expected: usize, found: usize },

    #[error("invalid rank {k}: must be between 1 and {max}")]
    InvalidRank { k: usize, max: usize },

    #[error("NMF input contains negative entries")]
    NegativeInput,

    #[error("cannot factor an empty {rows}x{cols} matrix")]
    EmptyMatrix { rows: usize, cols: usize },

    #[error("singular value decomposition did not converge")]
    SvdFailed,

    #[error("artifact {} does not match the in-memory matrix after read-back", .path.display())]
    ArtifactMismatch { path: PathBuf },

    #[error("empty corpus")]
    EmptyCorpus,
}

pub type Result<T> = std::result::Result<T, Error>;
