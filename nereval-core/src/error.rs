//! # Typed errors
//!
//! Every failure the harness can hit is one of these variants and reaches the
//! caller through [`Result`]. Nothing is printed and dropped along the way.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T, E = NerError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum NerError {
    /// Corpus file missing or unreadable.
    #[error("cannot read corpus {path}: {source}")]
    CorpusIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corpus file readable but not a valid tab-separated UTF-8 file.
    #[error("malformed corpus {path} (record {record}): {reason}")]
    MalformedCorpus {
        path: PathBuf,
        record: usize,
        reason: String,
    },

    /// An annotator backend could not be built or failed while tagging.
    #[error("model {backend} failed: {reason}")]
    Model { backend: String, reason: String },

    /// A span that cannot be placed inside its sentence.
    #[error("invalid span [{start}, {end}) '{label}' in {sentence:?}: {reason}")]
    InvalidSpan {
        sentence: String,
        start: usize,
        end: usize,
        label: String,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot export to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NerError {
    pub(crate) fn model(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        NerError::Model {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for NerError {
    fn from(err: serde_json::Error) -> Self {
        NerError::Config(err.to_string())
    }
}
