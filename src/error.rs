use std::path::PathBuf;
use thiserror::Error;

/// Failures of the backing storage. Reads degrade to empty state; these
/// surface from writes and from strict read-modify-write reads.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document exists but does not parse; it is left untouched.
    #[error("Corrupt document {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A token string that does not match any recognized shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Unrecognized token: {0}")]
    Unrecognized(String),

    #[error("Token is missing its {0}")]
    MissingArgument(&'static str),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),
}

/// Errors produced while routing a single token.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Malformed token: {0}")]
    MalformedToken(#[from] TokenError),

    #[error("Storage unavailable: {0}")]
    Storage(#[from] StoreError),
}

/// Convenience alias used by the store layer.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
