//! Fixed-cadence scheduling of scan runs
//!
//! A tick starts a run only if no earlier run is still executing. Runs are
//! spawned as their own tasks so a panic inside one is logged and the loop
//! keeps ticking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Work performed on every tick
#[async_trait]
pub trait ScheduledTask: Send + Sync + 'static {
    async fn run(&self);

    fn name(&self) -> &str;
}

/// Configuration for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    /// Fire on wall-clock multiples of `interval` instead of immediately
    pub align_to_interval: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            align_to_interval: true,
        }
    }
}

/// Admits at most one run at a time
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    inner: Arc<Mutex<()>>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard without waiting; `None` while another run holds it
    pub fn try_acquire(&self) -> Option<OwnedMutexGuard<()>> {
        self.inner.clone().try_lock_owned().ok()
    }

    pub fn is_running(&self) -> bool {
        self.inner.try_lock().is_err()
    }

    /// Wait until the current run, if any, has finished
    pub async fn wait_idle(&self) {
        let _idle = self.inner.lock().await;
    }
}

/// Delay from `now` to the next wall-clock multiple of `interval`
pub fn delay_until_next_boundary(now: DateTime<Utc>, interval: Duration) -> Duration {
    let period_ms = (interval.as_millis() as i64).max(1);
    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(period_ms) + 1) * period_ms;
    Duration::from_millis((next_ms - now_ms) as u64)
}

/// Background loop that triggers a task on a fixed cadence
pub struct Scheduler {
    guard: RunGuard,
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn the scheduling loop
    pub fn start(task: Arc<dyn ScheduledTask>, config: SchedulerConfig, guard: RunGuard) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let loop_guard = guard.clone();
        let handle = tokio::spawn(async move {
            Self::worker_loop(task, config, loop_guard, shutdown_rx).await;
        });

        Self {
            guard,
            shutdown_tx,
            handle,
        }
    }

    async fn worker_loop(
        task: Arc<dyn ScheduledTask>,
        config: SchedulerConfig,
        guard: RunGuard,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let first_delay = if config.align_to_interval {
            delay_until_next_boundary(Utc::now(), config.interval)
        } else {
            Duration::ZERO
        };

        let mut ticker = interval_at(Instant::now() + first_delay, config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            task = task.name(),
            interval_secs = config.interval.as_secs(),
            first_run_in_secs = first_delay.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    Self::trigger(&task, &guard);
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!(task = task.name(), "Scheduler shutting down");
                    break;
                }
            }
        }

        guard.wait_idle().await;
    }

    fn trigger(task: &Arc<dyn ScheduledTask>, guard: &RunGuard) {
        let Some(permit) = guard.try_acquire() else {
            tracing::warn!(
                task = task.name(),
                "Previous run still in progress, skipping this tick"
            );
            return;
        };

        let task = task.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let name = task.name().to_string();
            let run = tokio::spawn(async move { task.run().await });

            if let Err(e) = run.await {
                if e.is_panic() {
                    tracing::error!(task = %name, "Run panicked");
                } else {
                    tracing::error!(task = %name, error = %e, "Run was cancelled");
                }
            }
        });
    }

    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Stop ticking and wait for an in-flight run to finish
    pub async fn shutdown(self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(
                error = %e,
                "Failed to send shutdown signal to scheduler"
            );
        }
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Scheduler loop terminated abnormally");
        }
    }
}
