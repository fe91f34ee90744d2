//! Error types shared by the restructurer and the loader

use std::path::PathBuf;
use thiserror::Error;

use crate::restructure::ValidationReport;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// One or more source records failed validation
    #[error("{0}")]
    Validation(ValidationReport),

    /// The table definitions are inconsistent
    #[error("schema error: {0}")]
    Schema(String),

    /// A flat document section does not match its table definition
    #[error("malformed document: table `{table}`, row {row}: {message}")]
    MalformedDocument {
        table: String,
        row: usize,
        message: String,
    },

    /// A foreign-key or uniqueness constraint rejected a row
    #[error("integrity error: table `{table}`, row {row} ({values}): {message}")]
    Integrity {
        table: String,
        row: usize,
        values: String,
        message: String,
    },

    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Refusing to replace an existing output without --force
    #[error("{0:?} already exists (use --force to overwrite)")]
    DestinationExists(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}
