//! FeedbackQueue: bounded mpsc channel drained by one worker task.
//!
//! `submit` never blocks and never waits for processing. Each event runs on
//! the blocking pool under a per-event timeout, so a slow store or oracle
//! cannot stall the runtime.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tessera_core::config::FeedbackConfig;
use tessera_core::errors::FeedbackError;
use tessera_core::models::{FeedbackAck, FeedbackEvent, StorageAction};
use tessera_core::traits::IFeedbackProcessor;

/// What to do with queued events on shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownMode {
    /// Process everything already accepted.
    Drain,
    /// Drop the backlog; only the event in flight completes.
    Discard,
}

#[derive(Debug, Default)]
struct QueueCounters {
    backlog: AtomicUsize,
    processed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    discarded: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time view of the queue counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub capacity: usize,
    /// Accepted but not yet picked up by the worker.
    pub backlog: usize,
    pub processed: u64,
    /// Events whose processing panicked or reported a failure.
    pub failed: u64,
    pub timed_out: u64,
    pub discarded: u64,
    pub rejected: u64,
    pub running: bool,
}

pub struct FeedbackQueue {
    sender: Mutex<Option<mpsc::Sender<FeedbackEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    discard: Arc<AtomicBool>,
    counters: Arc<QueueCounters>,
    capacity: usize,
}

impl FeedbackQueue {
    /// Start the worker on the current Tokio runtime.
    pub fn start(
        processor: Arc<dyn IFeedbackProcessor>,
        capacity: usize,
        event_timeout: Duration,
    ) -> Result<Self, FeedbackError> {
        let handle = Handle::try_current().map_err(|_| FeedbackError::NoRuntime)?;
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let discard = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(QueueCounters::default());

        let worker = handle.spawn(run_worker(
            rx,
            processor,
            Arc::clone(&counters),
            Arc::clone(&discard),
            event_timeout,
        ));
        info!(capacity, timeout_ms = event_timeout.as_millis() as u64, "feedback queue started");

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            discard,
            counters,
            capacity,
        })
    }

    pub fn from_config(
        processor: Arc<dyn IFeedbackProcessor>,
        config: &FeedbackConfig,
    ) -> Result<Self, FeedbackError> {
        Self::start(
            processor,
            config.queue_capacity,
            Duration::from_secs(config.event_timeout_secs),
        )
    }

    /// Enqueue without waiting. A full or closed queue rejects the event.
    pub fn submit(&self, event: FeedbackEvent) -> FeedbackAck {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = guard.as_ref() else {
            return self.reject(FeedbackError::QueueClosed);
        };

        // Count before sending so the worker never sees a backlog below zero.
        self.counters.backlog.fetch_add(1, Ordering::AcqRel);
        match sender.try_send(event) {
            Ok(()) => FeedbackAck::Accepted,
            Err(err) => {
                self.counters.backlog.fetch_sub(1, Ordering::AcqRel);
                match err {
                    TrySendError::Full(_) => self.reject(FeedbackError::QueueFull {
                        capacity: self.capacity,
                    }),
                    TrySendError::Closed(_) => self.reject(FeedbackError::QueueClosed),
                }
            }
        }
    }

    fn reject(&self, error: FeedbackError) -> FeedbackAck {
        self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        debug!(error = %error, "feedback rejected");
        FeedbackAck::Rejected {
            reason: error.to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        let guard = self.worker.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().is_some_and(|w| !w.is_finished())
    }

    pub fn stats(&self) -> QueueStats {
        let c = &self.counters;
        QueueStats {
            capacity: self.capacity,
            backlog: c.backlog.load(Ordering::Acquire),
            processed: c.processed.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
            timed_out: c.timed_out.load(Ordering::Relaxed),
            discarded: c.discarded.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            running: self.is_running(),
        }
    }

    /// Close the queue and wait for the worker. Later submissions are rejected.
    pub async fn shutdown(&self, mode: ShutdownMode) -> QueueStats {
        if mode == ShutdownMode::Discard {
            self.discard.store(true, Ordering::Release);
        }
        // Dropping the only sender lets the worker observe channel closure.
        drop(self.sender.lock().unwrap_or_else(|e| e.into_inner()).take());

        let worker = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "feedback worker ended abnormally");
            }
        }
        let stats = self.stats();
        info!(
            mode = ?mode,
            processed = stats.processed,
            discarded = stats.discarded,
            "feedback queue stopped"
        );
        stats
    }
}

async fn run_worker(
    mut inbox: mpsc::Receiver<FeedbackEvent>,
    processor: Arc<dyn IFeedbackProcessor>,
    counters: Arc<QueueCounters>,
    discard: Arc<AtomicBool>,
    event_timeout: Duration,
) {
    while let Some(event) = inbox.recv().await {
        counters.backlog.fetch_sub(1, Ordering::AcqRel);
        if discard.load(Ordering::Acquire) {
            counters.discarded.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        let processor = Arc::clone(&processor);
        let task = tokio::task::spawn_blocking(move || processor.process(&event));
        match tokio::time::timeout(event_timeout, task).await {
            Ok(Ok(outcome)) => {
                counters.processed.fetch_add(1, Ordering::Relaxed);
                if outcome.update_failures > 0 || outcome.action == StorageAction::Failed {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            Ok(Err(e)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "feedback processing panicked");
            }
            Err(_) => {
                // The blocking task keeps running detached; its result is dropped.
                counters.timed_out.fetch_add(1, Ordering::Relaxed);
                warn!(
                    timeout_ms = event_timeout.as_millis() as u64,
                    "feedback processing timed out"
                );
            }
        }
    }
    debug!("feedback worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_without_runtime_fails() {
        struct Nothing;
        impl IFeedbackProcessor for Nothing {
            fn process(&self, _event: &FeedbackEvent) -> tessera_core::models::FeedbackOutcome {
                unreachable!()
            }
        }
        let result = FeedbackQueue::start(Arc::new(Nothing), 4, Duration::from_secs(1));
        assert!(matches!(result, Err(FeedbackError::NoRuntime)));
    }

    #[test]
    fn stats_serialize_with_snake_case_fields() {
        let json = serde_json::to_value(QueueStats::default()).unwrap();
        assert_eq!(json["timed_out"], 0);
        assert_eq!(json["running"], false);
    }
}
