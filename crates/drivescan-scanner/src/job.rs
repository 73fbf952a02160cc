//! A complete scheduled run: scan, then notify if anything was found

use chrono::Utc;
use drivescan_core::{NotificationPayload, Notifier, NotifyError};
use std::sync::Arc;

use crate::error::ScanError;
use crate::orchestrator::ScanOrchestrator;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The root has no subfolders; nothing was traversed or sent
    NoSubfolders,
    /// Subfolders were walked but held no files; nothing was sent
    NoFiles { subfolders: usize, failures: usize },
    /// The endpoint accepted the file list
    Notified { files: usize, failures: usize },
    /// Files were found but delivery failed; they are dropped
    NotifyFailed {
        files: usize,
        failures: usize,
        error: NotifyError,
    },
}

impl RunOutcome {
    pub fn notification_attempted(&self) -> bool {
        matches!(
            self,
            RunOutcome::Notified { .. } | RunOutcome::NotifyFailed { .. }
        )
    }
}

pub struct ScanJob {
    orchestrator: ScanOrchestrator,
    notifier: Arc<dyn Notifier>,
}

impl ScanJob {
    pub fn new(orchestrator: ScanOrchestrator, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            orchestrator,
            notifier,
        }
    }

    /// Scan beneath `root_folder_id` and post the aggregate file list.
    ///
    /// Notification failures are logged and reported in the outcome, never
    /// returned as errors. Only a failed root listing is an error.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, root_folder_id: &str) -> Result<RunOutcome, ScanError> {
        let report = self.orchestrator.scan(root_folder_id).await?;
        let failures = report.failures.len();

        if report.subfolders.is_empty() {
            tracing::info!("No subfolders to scan, exiting");
            return Ok(RunOutcome::NoSubfolders);
        }

        if report.result.is_empty() {
            tracing::info!(
                subfolders = report.subfolders.len(),
                failures,
                "No files found"
            );
            return Ok(RunOutcome::NoFiles {
                subfolders: report.subfolders.len(),
                failures,
            });
        }

        let file_count = report.result.len();
        tracing::info!(
            file_count,
            folders_visited = report.folders_visited,
            failures,
            "File(s) found"
        );
        let files = report.result.into_files();
        for file in &files {
            tracing::debug!(file_id = %file.id, file_name = %file.name, "Found file");
        }

        let payload = NotificationPayload::new(files, Utc::now());

        match self.notifier.notify(&payload).await {
            Ok(()) => Ok(RunOutcome::Notified {
                files: file_count,
                failures,
            }),
            Err(error) => {
                if error.is_timeout() {
                    tracing::error!(error = %error, "Notification call timed out");
                } else {
                    tracing::error!(error = %error, "Failed to deliver notification");
                }
                Ok(RunOutcome::NotifyFailed {
                    files: file_count,
                    failures,
                    error,
                })
            }
        }
    }
}
