use drivescan_storage::DirectoryError;

/// Failure that ends a scan before any subfolder is traversed
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Failed to list subfolders of root folder {folder_id}: {source}")]
    RootListing {
        folder_id: String,
        #[source]
        source: DirectoryError,
    },
}
