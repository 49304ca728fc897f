//! Error types for chess-stats-core

use std::sync::Arc;

use thiserror::Error;

/// Failures surfaced by the API client and the entity cache.
///
/// `Clone` so that a single failed fetch can be handed to every caller
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[source] Arc<reqwest::Error>),

    #[error("JSON parsing failed: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Api(_) | Error::Http(_) | Error::Json(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
