//! Error types module
//!
//! Each failure domain of a run has its own error type so callers can decide
//! what is fatal to the run and what is only logged.

use std::io;
use std::path::PathBuf;

/// Missing or invalid configuration. A run that hits this aborts before any
/// remote query is made.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set in the environment variables")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure to turn the encoded credential blob into a usable key file
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credentials are not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Credentials are not a valid service account document: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error("Failed to write credentials to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read credentials from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outbound notification failure. Logged by the caller, never retried.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Endpoint returned non-2xx status: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send notification: {0}")]
    Transport(String),

    #[error("Failed to serialize notification payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl NotifyError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, NotifyError::Timeout(_))
    }
}
