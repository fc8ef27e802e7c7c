use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::kernel::component::ComponentId;
use crate::kernel::completion::RunId;
use crate::timer::{duration_ms, DelayFacility, TimerHandle};

/// Handle of an armed watchdog, tagged with the run it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GuardHandle {
    pub timer: TimerHandle,
    pub run: RunId,
}

/// Introspection row for an armed watchdog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmedGuard {
    pub component: ComponentId,
    pub run: RunId,
    pub timer: TimerHandle,
    pub remaining_ms: Option<u64>,
}

/// One cancelable deadline per initializing component.
///
/// The duration is a per-run setting shared by every component. Expiry
/// callbacks are supplied by the scheduler and must route into its failure
/// path; the guard itself never touches lifecycle state.
pub struct TimeoutGuard {
    delay: Arc<dyn DelayFacility>,
    duration: Duration,
    armed: HashMap<ComponentId, GuardHandle>,
}

impl fmt::Debug for TimeoutGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutGuard")
            .field("duration", &self.duration)
            .field("armed", &self.armed.len())
            .finish()
    }
}

impl TimeoutGuard {
    pub fn new(delay: Arc<dyn DelayFacility>, duration: Duration) -> Self {
        Self {
            delay,
            duration,
            armed: HashMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn facility(&self) -> &Arc<dyn DelayFacility> {
        &self.delay
    }

    /// Schedule `on_expire` after the guard duration.
    ///
    /// A guard still armed for the same component is canceled first.
    pub fn arm<F>(&mut self, component: ComponentId, run: RunId, on_expire: F) -> GuardHandle
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(previous) = self.armed.remove(&component) {
            log::warn!("Re-arming timeout guard for '{}'; canceling {}", component, previous.timer);
            self.cancel(previous);
        }
        let timer = self.delay.schedule(self.duration, Box::new(on_expire));
        let handle = GuardHandle { timer, run };
        log::debug!("Armed {:?} timeout for '{}' ({}, run {})", self.duration, component, timer, run);
        self.armed.insert(component, handle);
        handle
    }

    /// Idempotent; a no-op when the guard already fired or was canceled
    pub fn cancel(&self, handle: GuardHandle) -> bool {
        self.delay.cancel(handle.timer)
    }

    /// Cancel and forget the guard of a component
    pub fn disarm(&mut self, component: &str) -> bool {
        match self.armed.remove(component) {
            Some(handle) => {
                self.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Cancel every armed guard
    pub fn clear(&mut self) {
        for (_, handle) in self.armed.drain() {
            self.delay.cancel(handle.timer);
        }
    }

    pub fn handle_of(&self, component: &str) -> Option<GuardHandle> {
        self.armed.get(component).copied()
    }

    pub fn remaining(&self, component: &str) -> Option<Duration> {
        self.armed
            .get(component)
            .and_then(|h| self.delay.remaining(h.timer))
    }

    pub fn is_armed(&self, component: &str) -> bool {
        self.armed.contains_key(component)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Armed guards sorted by component id
    pub fn armed(&self) -> Vec<ArmedGuard> {
        let mut rows: Vec<ArmedGuard> = self
            .armed
            .iter()
            .map(|(component, handle)| ArmedGuard {
                component: component.clone(),
                run: handle.run,
                timer: handle.timer,
                remaining_ms: self.delay.remaining(handle.timer).map(duration_ms),
            })
            .collect();
        rows.sort_by(|a, b| a.component.cmp(&b.component));
        rows
    }
}
