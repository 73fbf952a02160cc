//! Drivescan worker
//!
//! Wires configuration, the Drive client, the scan job and the notifier into
//! a task the scheduler can run.

pub mod runner;

pub use runner::ScanRunner;
