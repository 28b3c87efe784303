//! Run progress, phases, and cooperative cancellation

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress callback invoked in processing order from the run's task
pub type ProgressCallback<'a> = Option<&'a (dyn Fn(&Progress) + Send + Sync)>;

/// Snapshot of an in-flight reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Planned actions (uninstalls + installs)
    pub total: usize,

    /// Actions started so far
    pub current: usize,

    /// Status text for the current action
    pub text: String,
}

impl Progress {
    /// Create a tracker sized to the planned action count
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            text: String::new(),
        }
    }

    /// Move to the next action
    pub fn advance(&mut self, text: impl Into<String>) {
        self.current += 1;
        self.text = text.into();
    }

    /// Whole percent complete, clamped to 0..=100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.current.min(self.total) * 100) / self.total;
        pct as u8
    }
}

/// Phases of a reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    ComputingDelta,
    NoOp,
    Running,
    Uninstalling,
    Installing,
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::ComputingDelta => "computing delta",
            RunPhase::NoOp => "no-op",
            RunPhase::Running => "running",
            RunPhase::Uninstalling => "uninstalling",
            RunPhase::Installing => "installing",
            RunPhase::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Polled cancellation signal shared between a run and whoever started it.
///
/// Cancelling never interrupts a host call already in flight; the run
/// notices at its next check point.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
