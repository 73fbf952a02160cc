//! Domain models
//!
//! Everything here lives for a single scan: items are created from listing
//! responses and dropped once the notification for the run has been attempted.

pub mod item;
pub mod notification;
pub mod scan;

pub use item::{ChildKind, FileRecord, FolderRef, RemoteItem};
pub use notification::NotificationPayload;
pub use scan::ScanResult;
