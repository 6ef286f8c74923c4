//! Storage traits and error types
//!
//! This module defines the trait interface for article sinks and the error
//! type shared by every on-disk store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the text of relevant articles
///
/// Each identifier is written at most once; the crawl engine never asks to
/// persist an identifier twice.
pub trait ArticleStore {
    /// Writes the article text for `identifier`
    fn persist(&mut self, identifier: &str, text: &str) -> StorageResult<()>;
}
