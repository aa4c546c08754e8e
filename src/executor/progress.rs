//! Push-based progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::types::PairFailure;

/// Events pushed to the caller while a run executes.
///
/// `Progress.fraction` never decreases within a run and is exactly 1.0
/// after the last pair of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started {
        total_pairs: usize,
    },
    PairFailed(PairFailure),
    Progress {
        model_id: String,
        scenario_id: String,
        succeeded: bool,
        completed: usize,
        total: usize,
        fraction: f64,
    },
    Finished {
        results: usize,
        failures: usize,
        cancelled: bool,
    },
}

/// Completed-pair counter for one run.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProgressTracker {
    completed: usize,
    total: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    /// Count one more attempted pair and return the new fraction.
    pub fn advance(&mut self) -> f64 {
        self.completed = (self.completed + 1).min(self.total);
        self.fraction()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Optional event channel. Sends after the receiver is dropped are ignored.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: Option<UnboundedSender<RunEvent>>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: RunEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Caller-held switch that stops a run between pairs.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
