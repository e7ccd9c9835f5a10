use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("failed to write draft {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to serialise draft: {0}")]
    Serialize(#[from] serde_json::Error),
}
