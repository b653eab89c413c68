//! Error types shared by the engine
//!
//! Recoverable data problems (bad edges, duplicate node ids) are not errors:
//! they are dropped with a diagnostic. These variants cover the failures that
//! stop a feed from being loaded or an output from being written.

use thiserror::Error;

/// Errors that can occur while loading feeds, configs, or writing output
#[derive(Error, Debug)]
pub enum GraphError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The feed payload could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The configuration file is invalid
    #[error("config error: {0}")]
    Config(String),

    /// A rendering/template error occurred
    #[error("render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Parse(err.to_string())
    }
}

impl From<askama::Error> for GraphError {
    fn from(err: askama::Error) -> Self {
        GraphError::Render(err.to_string())
    }
}

/// Result type for engine operations
pub type GraphResult<T> = Result<T, GraphError>;
