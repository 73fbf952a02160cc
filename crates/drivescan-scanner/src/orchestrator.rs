//! One scan of the root folder: list its direct subfolders, walk each one and
//! merge what the walks return.

use drivescan_core::{ChildKind, FolderRef, ScanResult};
use drivescan_storage::DirectoryClient;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::ScanError;
use crate::traverser::{FolderFailure, FolderTraverser, Traversal};

/// Configuration for the scan orchestrator
#[derive(Debug, Clone)]
pub struct ScanOrchestratorConfig {
    /// Subfolder walks allowed in flight at once; 1 walks them one after another
    pub max_concurrent_traversals: usize,
}

impl Default for ScanOrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_traversals: 1,
        }
    }
}

/// Merged outcome of all subfolder walks of one scan
#[derive(Debug, Default)]
pub struct ScanReport {
    pub subfolders: Vec<FolderRef>,
    pub result: ScanResult,
    pub failures: Vec<FolderFailure>,
    pub folders_visited: usize,
}

pub struct ScanOrchestrator {
    client: Arc<dyn DirectoryClient>,
    traverser: FolderTraverser,
    config: ScanOrchestratorConfig,
}

impl ScanOrchestrator {
    pub fn new(client: Arc<dyn DirectoryClient>, config: ScanOrchestratorConfig) -> Self {
        Self {
            traverser: FolderTraverser::new(client.clone()),
            client,
            config,
        }
    }

    /// Scan everything beneath the direct subfolders of `root_folder_id`.
    ///
    /// Files placed directly in the root are not part of the scan. Only the
    /// root listing itself can fail the scan; failures inside a subfolder are
    /// returned in the report next to the files found elsewhere.
    #[tracing::instrument(skip(self))]
    pub async fn scan(&self, root_folder_id: &str) -> Result<ScanReport, ScanError> {
        let subfolders: Vec<FolderRef> = self
            .client
            .list_children(root_folder_id, ChildKind::Folder)
            .await
            .map_err(|source| ScanError::RootListing {
                folder_id: root_folder_id.to_string(),
                source,
            })?
            .into_iter()
            .map(FolderRef::from)
            .collect();

        if subfolders.is_empty() {
            tracing::info!("No subfolders found in root folder");
            return Ok(ScanReport::default());
        }

        tracing::info!(
            subfolder_count = subfolders.len(),
            "Subfolder(s) found in root folder"
        );

        let traversals = if self.config.max_concurrent_traversals <= 1 {
            self.traverse_sequential(&subfolders).await
        } else {
            self.traverse_concurrent(&subfolders).await
        };

        let mut report = ScanReport {
            subfolders,
            ..Default::default()
        };
        for traversal in traversals {
            report.folders_visited += traversal.folders_visited;
            report.result.merge(traversal.files);
            report.failures.extend(traversal.failures);
        }

        for failure in &report.failures {
            tracing::error!(
                folder_id = %failure.folder_id,
                kind = %failure.kind,
                error = %failure.error,
                "Error while accessing folder, skipping its subtree"
            );
        }

        Ok(report)
    }

    async fn traverse_sequential(&self, subfolders: &[FolderRef]) -> Vec<Traversal> {
        let mut traversals = Vec::with_capacity(subfolders.len());
        for subfolder in subfolders {
            tracing::info!(
                folder_id = %subfolder.id,
                folder_name = %subfolder.name,
                "Starting traversal for subfolder"
            );
            traversals.push(self.traverser.traverse(&subfolder.id).await);
        }
        traversals
    }

    async fn traverse_concurrent(&self, subfolders: &[FolderRef]) -> Vec<Traversal> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_traversals));

        let walks = subfolders.iter().map(|subfolder| {
            let semaphore = semaphore.clone();
            async move {
                // The semaphore is never closed, so acquisition cannot fail
                let _permit = semaphore.acquire().await.ok();
                tracing::info!(
                    folder_id = %subfolder.id,
                    folder_name = %subfolder.name,
                    "Starting traversal for subfolder"
                );
                self.traverser.traverse(&subfolder.id).await
            }
        });

        join_all(walks).await
    }
}
