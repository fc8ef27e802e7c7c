use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::host::{HostHook, ScriptHost};
use crate::kernel::completion::RunId;
use crate::registry::resolver::BlockedComponent;
use crate::registry::{LifecycleState, StateTracker};

/// Completion callback stored for the active run
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Per-state counts projected from the state tracker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub uninitialized: usize,
    pub queued: usize,
    pub initializing: usize,
    pub initialized: usize,
    pub failed: usize,
}

impl Progress {
    pub fn of(tracker: &StateTracker) -> Self {
        Self {
            total: tracker.len(),
            uninitialized: tracker.count(LifecycleState::UnInitialized),
            queued: tracker.count(LifecycleState::Queued),
            initializing: tracker.count(LifecycleState::Initializing),
            initialized: tracker.count(LifecycleState::Initialized),
            failed: tracker.count(LifecycleState::Failed),
        }
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    pub fn initialized_count(&self) -> usize {
        self.initialized
    }

    /// Every registered component is `Initialized`
    pub fn is_complete(&self) -> bool {
        self.initialized == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} initialized ({} failed, {} initializing, {} queued, {} uninitialized)",
            self.initialized, self.total, self.failed, self.initializing, self.queued, self.uninitialized
        )
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    Complete {
        run: RunId,
        total: usize,
        ticks: u64,
    },
    Incomplete {
        run: RunId,
        initialized: usize,
        failed: usize,
        total: usize,
        ticks: u64,
        blocked: Vec<BlockedComponent>,
    },
}

impl BootstrapOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, BootstrapOutcome::Complete { .. })
    }

    pub fn run(&self) -> RunId {
        match self {
            BootstrapOutcome::Complete { run, .. } | BootstrapOutcome::Incomplete { run, .. } => *run,
        }
    }
}

/// Holds the completion callback of the active run and fires it exactly once.
///
/// The callback is taken out before it is invoked, so a second
/// `on_run_finished` for the same run finds nothing to call.
pub struct CompletionAggregator {
    host: Arc<dyn ScriptHost>,
    pending: Option<(RunId, CompletionCallback)>,
}

impl fmt::Debug for CompletionAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionAggregator")
            .field("host", &self.host)
            .field("pending_run", &self.pending.as_ref().map(|(run, _)| *run))
            .finish()
    }
}

impl CompletionAggregator {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self { host, pending: None }
    }

    pub fn host(&self) -> &Arc<dyn ScriptHost> {
        &self.host
    }

    /// Store the callback for `run`, replacing any callback of an older run
    pub fn arm(&mut self, run: RunId, callback: CompletionCallback) {
        if let Some((stale, _)) = self.pending.replace((run, callback)) {
            log::warn!("Dropping completion callback of unfinished run {}", stale);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the callback of `run`, then notify the scripting host.
    ///
    /// Returns false (and notifies nobody) when `run` has no pending callback.
    pub fn on_run_finished(&mut self, run: RunId) -> bool {
        match self.pending.take() {
            Some((armed, callback)) if armed == run => {
                callback();
                self.host.notify(HostHook::BootstrapFinished);
                true
            }
            Some(other) => {
                log::warn!("Run {} finished but the pending callback belongs to run {}", run, other.0);
                self.pending = Some(other);
                false
            }
            None => {
                log::warn!("Run {} finished with no pending completion callback", run);
                false
            }
        }
    }
}
