use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the caller of a benchmark run.
///
/// Pair-level failures never appear here; they are collected as
/// [`InvocationError`]s on the run report instead.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A benchmark run is already in progress")]
    RunInProgress,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<BenchError> for String {
    fn from(err: BenchError) -> Self {
        err.to_string()
    }
}

/// Failure of a single (model, scenario) invocation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationError {
    #[error("Authorization denied ({status}): {message}")]
    Authorization { status: u16, message: String },

    #[error("Invocation timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Invocation service error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Request failed: {message}")]
    Transport { message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl InvocationError {
    /// Classify a non-success HTTP status. 403-class responses are
    /// authorization failures; everything else is a generic failure.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 403 {
            InvocationError::Authorization { status, message }
        } else {
            InvocationError::Http { status, message }
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        InvocationError::Transport {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        InvocationError::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, InvocationError::Authorization { .. })
    }
}
