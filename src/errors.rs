use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::SourceId;

/// Error type for configuration, source, IO, and persistence failures.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("raw source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("io failure at '{}': {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("json encoding failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no metadata at {}", path.display())]
    NotFound { path: PathBuf },
}

impl BuildError {
    /// Attach a path to a raw IO error.
    pub(crate) fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> BuildError {
        let path = path.into();
        move |source| BuildError::IoAt { path, source }
    }
}
