//! Error type shared by every stage of the crate.
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A `class_type` / `trial_type` tag that no profile knows about.
    #[error("unknown {kind} `{tag}` (expected one of: {allowed})")]
    UnknownTag {
        kind: &'static str,
        tag: String,
        allowed: String,
    },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The recording could not be decoded into a rectangular table.
    #[error("malformed recording {path}: {message}")]
    MalformedTable { path: PathBuf, message: String },

    #[error("recording {path} has no channel named `{channel}`")]
    MissingChannel { path: PathBuf, channel: String },

    #[error("session {path} contains no recording files")]
    EmptySession { path: PathBuf },

    #[error("index {index} out of range for dataset of {len} trials")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::MalformedTable { path: path.into(), message: message.into() }
    }
}
