use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or configuring loggers.
///
/// Nothing on the `Logger` trait returns this type: emission failures are absorbed by
/// the implementations and only show up in their stats.
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log level '{input}'. Valid levels: debug, info, warn, error")]
    InvalidLevel { input: String },

    #[error("Invalid traceparent header '{input}': {reason}")]
    InvalidTraceparent { input: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid endpoint URL '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("A global logger is already installed")]
    AlreadyInstalled,
}

impl LoggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::Io {
            path: path.into(),
            source,
        }
    }
}
