//! Error types and load result structures for the document store.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Structurally valid YAML that is not a usable document.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("no document with id '{0}'")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Outcome of loading a single document file.
#[derive(Debug)]
pub struct LoadResult {
    pub path: PathBuf,
    pub status: LoadStatus,
}

#[derive(Debug)]
pub enum LoadStatus {
    Loaded { document_id: String },
    /// Dotfile, non-YAML file and the like.
    Skipped { reason: String },
    /// Parse or validation error.
    Failed { error: String },
}
