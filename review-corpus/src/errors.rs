//! Typed error for the review-corpus crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be read.
    #[error("[Review Corpus] failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus JSON did not match the expected `{ "professors": [...] }` shape.
    #[error("[Review Corpus] invalid corpus JSON: {0}")]
    Json(#[from] serde_json::Error),
}
