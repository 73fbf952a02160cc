//! In-memory directory tree
//!
//! Deterministic stand-in for the remote service. Folders and files are
//! registered under a parent id; individual listings can be made to fail.
//! Every query is recorded so callers can assert on traversal behaviour.

use async_trait::async_trait;
use drivescan_core::{ChildKind, RemoteItem};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::traits::{DirectoryClient, DirectoryError, DirectoryResult};

#[derive(Debug, Default, Clone)]
struct Children {
    files: Vec<RemoteItem>,
    folders: Vec<RemoteItem>,
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    children: HashMap<String, Children>,
    failures: HashMap<(String, ChildKind), String>,
    latency: Option<Duration>,
    queries: Mutex<Vec<(String, ChildKind)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder `id` under `parent`
    pub fn add_folder(&mut self, parent: &str, id: &str, name: &str) -> &mut Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .folders
            .push(RemoteItem::new(id, name));
        self.children.entry(id.to_string()).or_default();
        self
    }

    /// Register a file `id` under `parent`
    pub fn add_file(&mut self, parent: &str, id: &str, name: &str) -> &mut Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .files
            .push(RemoteItem::new(id, name));
        self
    }

    /// Make every `kind` listing of `folder_id` fail with `message`
    pub fn fail(&mut self, folder_id: &str, kind: ChildKind, message: &str) -> &mut Self {
        self.failures
            .insert((folder_id.to_string(), kind), message.to_string());
        self
    }

    /// Delay every listing, to make overlapping queries observable
    pub fn with_latency(&mut self, latency: Duration) -> &mut Self {
        self.latency = Some(latency);
        self
    }

    /// Queries answered so far, in arrival order
    pub fn queries(&self) -> Vec<(String, ChildKind)> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }

    /// Highest number of listings that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, folder_id: &str, kind: ChildKind) {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((folder_id.to_string(), kind));
        }
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn list_children(
        &self,
        folder_id: &str,
        kind: ChildKind,
    ) -> DirectoryResult<Vec<RemoteItem>> {
        self.record(folder_id, kind);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = self.failures.get(&(folder_id.to_string(), kind)) {
            return Err(DirectoryError::Request(message.clone()));
        }

        // Unknown parents list as empty, like the remote service
        let children = self.children.get(folder_id).cloned().unwrap_or_default();
        Ok(match kind {
            ChildKind::File => children.files,
            ChildKind::Folder => children.folders,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
