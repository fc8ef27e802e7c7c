//! # Delay facility and timeout supervision
//!
//! The scheduler only consumes the [`DelayFacility`] contract: schedule a
//! one-shot callback after a delay, cancelable by handle, invoked at most once.
//! Two implementations are provided:
//!
//! - [`TimerManager`]: a virtual clock advanced by the host's frame loop
//!   (deterministic, used by the CLI and most tests).
//! - [`TokioDelay`]: wall-clock timers on the tokio runtime.
//!
//! [`TimeoutGuard`] arms one watchdog per initializing component on top of
//! whichever facility the scheduler was built with.
pub mod guard;
pub mod manager;
pub mod tokio_delay;

use std::fmt;
use std::time::Duration;

use serde::Serialize;

pub use guard::{ArmedGuard, GuardHandle, TimeoutGuard};
pub use manager::TimerManager;
pub use tokio_delay::TokioDelay;

/// One-shot callback run by a delay facility
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Opaque cancelable token returned by [`DelayFacility::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Read-only view of a pending timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerInfo {
    pub handle: TimerHandle,
    pub remaining_ms: u64,
    pub repeating: bool,
}

/// Contract consumed by the scheduler and its timeout guards
pub trait DelayFacility: Send + Sync + fmt::Debug {
    /// Run `callback` once after `delay`
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Prevent a pending callback from running; false if it already ran or was canceled
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Time left before a pending timer fires
    fn remaining(&self, handle: TimerHandle) -> Option<Duration>;

    /// All pending timers, for introspection only
    fn active_timers(&self) -> Vec<TimerInfo>;
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// Test module declaration
#[cfg(test)]
mod tests;
