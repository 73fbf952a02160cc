//! Drivescan Core Library
//!
//! This crate provides the domain models, configuration, credential handling and
//! error types shared by every drivescan component, plus the `Notifier` hook that
//! the scan job reports through.

pub mod config;
pub mod credentials;
pub mod error;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use config::{Config, LogFormat, ScanSettings};
pub use credentials::{decode_credentials, ServiceAccountKey, CREDENTIALS_FILE_NAME};
pub use error::{ConfigError, CredentialError, NotifyError};
pub use hooks::{NoOpNotifier, Notifier};
pub use models::{
    ChildKind, FileRecord, FolderRef, NotificationPayload, RemoteItem, ScanResult,
};
