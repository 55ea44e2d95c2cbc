//! Error types for the measurement source boundary.

use thiserror::Error;

/// Ways a request to the detection service can fail.
///
/// Callers treat both variants as the same failed outcome; the split only
/// matters for logs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure, non-success status, or an unreadable body.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A body arrived but does not match the expected schema, or the
    /// service reported an `error` in it.
    #[error("unexpected response shape: {0}")]
    DataShape(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::DataShape(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::DataShape(err.to_string())
    }
}
