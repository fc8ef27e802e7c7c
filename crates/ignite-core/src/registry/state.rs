use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kernel::component::ComponentId;
use crate::kernel::error::{Error, Result};

/// Lifecycle state of a component within a bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Not yet eligible, or reset by a new run
    #[default]
    UnInitialized,
    /// Every dependency is initialized; waiting for a dispatch slot
    Queued,
    /// Dispatched; waiting for the component to report
    Initializing,
    /// Success terminal
    Initialized,
    /// Failure terminal (reported failure, start error or timeout)
    Failed,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 5] = [
        LifecycleState::UnInitialized,
        LifecycleState::Queued,
        LifecycleState::Initializing,
        LifecycleState::Initialized,
        LifecycleState::Failed,
    ];

    /// Terminal for the current run
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Initialized | LifecycleState::Failed)
    }

    /// Legal edges of the lifecycle state machine
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (UnInitialized, Queued)
                | (Queued, Initializing)
                | (Initializing, Initialized)
                | (Initializing, Failed)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::UnInitialized => "UnInitialized",
            LifecycleState::Queued => "Queued",
            LifecycleState::Initializing => "Initializing",
            LifecycleState::Initialized => "Initialized",
            LifecycleState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Maps every registered component to its current lifecycle state
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    states: HashMap<ComponentId, LifecycleState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a component in `UnInitialized`
    pub fn track(&mut self, id: ComponentId) {
        self.states.insert(id, LifecycleState::UnInitialized);
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Current state; unknown components read as `UnInitialized`
    pub fn state_of(&self, id: &str) -> LifecycleState {
        self.states.get(id).copied().unwrap_or_default()
    }

    /// Move a component along a legal edge, returning the previous state
    pub fn transition(&mut self, id: &str, to: LifecycleState) -> Result<LifecycleState> {
        let Some(state) = self.states.get_mut(id) else {
            return Err(Error::UnknownComponent { component: ComponentId::from(id) });
        };
        let from = *state;
        if !from.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                component: ComponentId::from(id),
                from,
                to,
            });
        }
        *state = to;
        Ok(from)
    }

    /// Put every component back into `UnInitialized`
    pub fn reset_all(&mut self) {
        for state in self.states.values_mut() {
            *state = LifecycleState::UnInitialized;
        }
    }

    pub fn count(&self, state: LifecycleState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// True when every tracked component is in `state` (vacuously true when empty)
    pub fn all_in(&self, state: LifecycleState) -> bool {
        self.states.values().all(|s| *s == state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn snapshot(&self) -> HashMap<ComponentId, LifecycleState> {
        self.states.clone()
    }
}
