use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::FileRecord;

/// JSON body posted to the downstream endpoint after a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Send time, serialized as RFC 3339 UTC
    pub timestamp: DateTime<Utc>,
    pub files: Vec<FileRecord>,
}

impl NotificationPayload {
    pub fn new(files: Vec<FileRecord>, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, files }
    }
}
