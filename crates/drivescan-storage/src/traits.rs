//! Directory client abstraction
//!
//! This module defines the trait every remote listing backend implements.

use async_trait::async_trait;
use drivescan_core::{ChildKind, RemoteItem};
use thiserror::Error;

/// Listing operation errors
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Listing request failed: {0}")]
    Request(String),

    #[error("Listing returned non-2xx status: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Malformed listing response: {0}")]
    Decode(String),

    #[error("Folder not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for listing operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Read-only access to a remote folder tree
///
/// Implementations answer one level at a time; recursion is the caller's job.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Return the direct children of `folder_id` matching `kind`
    async fn list_children(
        &self,
        folder_id: &str,
        kind: ChildKind,
    ) -> DirectoryResult<Vec<RemoteItem>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
