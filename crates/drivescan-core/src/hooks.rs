//! Hooks for reporting scan results
//!
//! The scan job only knows this trait. The HTTP implementation lives in
//! `drivescan-infra`; tests substitute recording implementations.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::NotificationPayload;

/// Delivers the aggregate file list of a run to its consumer
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

/// Notifier that accepts and discards every payload
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _payload: &NotificationPayload) -> Result<(), NotifyError> {
        Ok(())
    }
}
