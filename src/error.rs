//! src/error.rs
//!
//! Error type shared by loading, editing, and configuration.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON array of records")]
    NotAnArray { path: PathBuf },

    #[error("data file not found: {0}")]
    MissingFile(PathBuf),

    #[error("no record named '{name}' in {file}")]
    RecordNotFound { file: String, name: String },

    #[error("{0}")]
    Invalid(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WorldError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorldError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        WorldError::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
