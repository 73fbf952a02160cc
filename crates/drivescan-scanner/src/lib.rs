//! Drivescan Scanner Library
//!
//! Walks a remote folder tree and reports the files found:
//! - `FolderTraverser` collects every file beneath one folder
//! - `ScanOrchestrator` runs one traversal per direct subfolder of the root
//! - `ScanJob` decides whether and what to notify for a run
//!
//! A listing failure inside a subtree only removes that subtree from the
//! result; it is reported as a `FolderFailure` alongside the files found
//! elsewhere.

pub mod error;
pub mod job;
pub mod orchestrator;
pub mod traverser;

pub use error::ScanError;
pub use job::{RunOutcome, ScanJob};
pub use orchestrator::{ScanOrchestrator, ScanOrchestratorConfig, ScanReport};
pub use traverser::{FolderFailure, FolderTraverser, Traversal};
