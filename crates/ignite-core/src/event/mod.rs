use std::fmt;

use serde::Serialize;

use crate::kernel::completion::{FailureReason, RunId};
use crate::kernel::component::ComponentId;
use crate::registry::LifecycleState;

/// Type for listener identifiers
pub type ListenerId = u64;

/// A lifecycle transition applied by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEvent {
    pub run: RunId,
    pub component: ComponentId,
    pub from: LifecycleState,
    pub to: LifecycleState,
    /// Set when `to` is `Failed`
    pub reason: Option<FailureReason>,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[run {}] {}: {} -> {}", self.run, self.component, self.from, self.to)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({})", reason)?;
        }
        Ok(())
    }
}

/// Listener callback; observes transitions, never mutates scheduler state
pub type TransitionListener = Box<dyn Fn(&TransitionEvent) + Send + Sync>;

/// Ordered set of transition listeners
#[derive(Default)]
pub struct TransitionListeners {
    listeners: Vec<(ListenerId, TransitionListener)>,
    next_id: ListenerId,
}

impl fmt::Debug for TransitionListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionListeners")
            .field("listener_count", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl TransitionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l_id, _)| *l_id != id);
        self.listeners.len() < before
    }

    /// Deliver to every listener in subscription order
    pub fn emit(&self, event: &TransitionEvent) {
        for (_, listener) in &self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
