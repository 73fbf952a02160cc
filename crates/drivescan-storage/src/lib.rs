//! Drivescan Storage Library
//!
//! This crate provides the remote directory abstraction the scanner walks:
//! the `DirectoryClient` trait, a Google Drive v3 implementation with
//! service-account authentication, and an in-memory implementation.
//!
//! # Listing contract
//!
//! A listing returns the direct children of one folder, filtered by kind:
//! folder queries never return files and file queries never return folders.
//! Only the first page of a listing is consumed; a truncated listing is
//! logged, not followed.

pub mod auth;
pub mod drive;
pub mod factory;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use auth::{ServiceAccountTokenProvider, StaticToken, TokenProvider, DRIVE_READONLY_SCOPE};
pub use drive::GoogleDriveClient;
pub use factory::{create_directory_client, create_directory_client_with_tokens};
pub use memory::InMemoryDirectory;
pub use traits::{DirectoryClient, DirectoryError, DirectoryResult};
