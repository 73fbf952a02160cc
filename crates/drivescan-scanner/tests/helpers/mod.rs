//! Test helpers: directory fixtures and a notifier that records what it is sent.

use async_trait::async_trait;
use drivescan_core::{NotificationPayload, Notifier, NotifyError};
use drivescan_scanner::{ScanJob, ScanOrchestrator, ScanOrchestratorConfig};
use drivescan_storage::InMemoryDirectory;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behaviour of the recording notifier on each call
#[derive(Clone, Copy)]
pub enum Reply {
    Accept,
    Reject(u16),
    TimeOut,
}

pub struct RecordingNotifier {
    reply: Reply,
    calls: Mutex<Vec<NotificationPayload>>,
}

impl RecordingNotifier {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<NotificationPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.calls.lock().unwrap().push(payload.clone());
        match self.reply {
            Reply::Accept => Ok(()),
            Reply::Reject(status) => Err(NotifyError::Status {
                status,
                body: "rejected".to_string(),
            }),
            Reply::TimeOut => Err(NotifyError::Timeout(Duration::from_secs(2))),
        }
    }
}

/// root -> A (f1, f2), B (no files) -> C (f3)
pub fn scenario_tree() -> InMemoryDirectory {
    let mut dir = InMemoryDirectory::new();
    dir.add_folder("root", "A", "A")
        .add_folder("root", "B", "B")
        .add_file("A", "f1", "a.txt")
        .add_file("A", "f2", "b.txt")
        .add_folder("B", "C", "C")
        .add_file("C", "f3", "c.txt");
    dir
}

pub fn job(
    dir: Arc<InMemoryDirectory>,
    notifier: Arc<RecordingNotifier>,
    concurrency: usize,
) -> ScanJob {
    let orchestrator = ScanOrchestrator::new(
        dir,
        ScanOrchestratorConfig {
            max_concurrent_traversals: concurrency,
        },
    );
    ScanJob::new(orchestrator, notifier)
}
