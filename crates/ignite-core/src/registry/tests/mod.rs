// Registry test module
#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod state_tests;

use std::sync::Arc;

use crate::kernel::completion::Completer;
use crate::kernel::component::{Component, ComponentId};
use crate::kernel::error::Result;
use crate::registry::{ComponentRegistry, LifecycleState, StateTracker};

#[derive(Debug)]
pub(crate) struct Stub {
    id: &'static str,
    deps: Vec<&'static str>,
}

impl Stub {
    pub(crate) fn new(id: &'static str, deps: &[&'static str]) -> Arc<Self> {
        Arc::new(Self { id, deps: deps.to_vec() })
    }
}

impl Component for Stub {
    fn id(&self) -> ComponentId {
        self.id.into()
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        self.deps.iter().map(|d| ComponentId::from(*d)).collect()
    }

    fn start(&self, completer: Completer) -> Result<()> {
        completer.succeed();
        Ok(())
    }
}

/// Registry plus tracker over `(id, deps)` pairs, everything `UnInitialized`
pub(crate) fn graph(components: &[(&'static str, &[&'static str])]) -> (ComponentRegistry, StateTracker) {
    let mut registry = ComponentRegistry::new();
    let mut tracker = StateTracker::new();
    for (id, deps) in components {
        let id = registry.register(Stub::new(*id, deps)).unwrap();
        tracker.track(id);
    }
    (registry, tracker)
}

/// Walk a component along the legal edges up to `state`
pub(crate) fn advance(tracker: &mut StateTracker, id: &str, state: LifecycleState) {
    let path: &[LifecycleState] = match state {
        LifecycleState::UnInitialized => &[],
        LifecycleState::Queued => &[LifecycleState::Queued],
        LifecycleState::Initializing => &[LifecycleState::Queued, LifecycleState::Initializing],
        LifecycleState::Initialized => &[
            LifecycleState::Queued,
            LifecycleState::Initializing,
            LifecycleState::Initialized,
        ],
        LifecycleState::Failed => &[
            LifecycleState::Queued,
            LifecycleState::Initializing,
            LifecycleState::Failed,
        ],
    };
    for next in path {
        tracker.transition(id, *next).unwrap();
    }
}
