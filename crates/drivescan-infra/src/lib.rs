//! Drivescan Infrastructure Library
//!
//! Shared runtime plumbing for the worker:
//! - Telemetry initialization (tracing subscriber)
//! - Notification delivery over HTTP
//! - Interval scheduling with single-run mutual exclusion

pub mod notify;
pub mod schedule;
pub mod telemetry;

// Re-export commonly used types
pub use notify::{HttpNotifier, HttpNotifierConfig};
pub use schedule::{RunGuard, ScheduledTask, Scheduler, SchedulerConfig};
pub use telemetry::init_telemetry;
