use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Mime type the remote service uses to mark an item as a directory
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Which kind of children a listing query should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// Everything that is not a folder
    File,
    /// Folders only
    Folder,
}

impl ChildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildKind::File => "file",
            ChildKind::Folder => "folder",
        }
    }
}

impl Display for ChildKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One child entry as returned by a listing query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
}

impl RemoteItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A discovered non-folder item.
///
/// Only `id` and `name` are carried so nothing else can leak into the
/// notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
}

impl FileRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<RemoteItem> for FileRecord {
    fn from(item: RemoteItem) -> Self {
        FileRecord {
            id: item.id,
            name: item.name,
        }
    }
}

/// A folder waiting to be visited during traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

impl From<RemoteItem> for FolderRef {
    fn from(item: RemoteItem) -> Self {
        FolderRef {
            id: item.id,
            name: item.name,
        }
    }
}
