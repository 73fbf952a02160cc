//! Depth-first collection of the files beneath one folder
//!
//! The walk uses an explicit stack of pending folder ids, so tree depth is
//! bounded by heap, not by the call stack. There is no cycle detection; the
//! remote tree is assumed to be acyclic.

use drivescan_core::{ChildKind, FileRecord, FolderRef};
use drivescan_storage::{DirectoryClient, DirectoryError};
use std::sync::Arc;

/// A folder whose listing failed. Nothing beneath it was visited.
#[derive(Debug)]
pub struct FolderFailure {
    pub folder_id: String,
    pub kind: ChildKind,
    pub error: DirectoryError,
}

/// Everything one traversal produced
#[derive(Debug, Default)]
pub struct Traversal {
    pub files: Vec<FileRecord>,
    pub failures: Vec<FolderFailure>,
    pub folders_visited: usize,
}

/// Walks a folder subtree through a `DirectoryClient`
#[derive(Clone)]
pub struct FolderTraverser {
    client: Arc<dyn DirectoryClient>,
}

impl FolderTraverser {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }

    /// Collect every file in `folder_id` and all of its descendants.
    ///
    /// Each folder costs two listings: its files first, then its subfolders.
    /// If either fails, the folder's subtree is abandoned and the failure is
    /// recorded; files already listed from that folder are kept and the walk
    /// continues with the remaining pending folders.
    #[tracing::instrument(skip(self), fields(backend = self.client.backend_name()))]
    pub async fn traverse(&self, folder_id: &str) -> Traversal {
        let mut traversal = Traversal::default();
        let mut pending = vec![folder_id.to_string()];

        while let Some(current) = pending.pop() {
            traversal.folders_visited += 1;
            tracing::debug!(folder_id = %current, "Checking folder");

            let files = match self.client.list_children(&current, ChildKind::File).await {
                Ok(files) => files,
                Err(error) => {
                    traversal.failures.push(FolderFailure {
                        folder_id: current,
                        kind: ChildKind::File,
                        error,
                    });
                    continue;
                }
            };

            if files.is_empty() {
                tracing::debug!(folder_id = %current, "No files found in folder");
            } else {
                tracing::debug!(
                    folder_id = %current,
                    file_count = files.len(),
                    "Files found in folder"
                );
            }
            traversal
                .files
                .extend(files.into_iter().map(FileRecord::from));

            let subfolders = match self.client.list_children(&current, ChildKind::Folder).await {
                Ok(subfolders) => subfolders,
                Err(error) => {
                    traversal.failures.push(FolderFailure {
                        folder_id: current,
                        kind: ChildKind::Folder,
                        error,
                    });
                    continue;
                }
            };

            // Reversed so the first listed subfolder is walked first
            for subfolder in subfolders.into_iter().rev().map(FolderRef::from) {
                tracing::debug!(
                    parent_id = %current,
                    folder_id = %subfolder.id,
                    folder_name = %subfolder.name,
                    "Subfolder found"
                );
                pending.push(subfolder.id);
            }
        }

        traversal
    }
}
