use serde::Serialize;

use crate::kernel::aggregator::{BootstrapOutcome, Progress};
use crate::kernel::completion::{FailureReason, RunId};
use crate::kernel::component::ComponentId;
use crate::registry::LifecycleState;
use crate::timer::{ArmedGuard, TimerInfo};

/// One `(id, state, dependencies)` row of the introspection surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    pub id: ComponentId,
    pub state: LifecycleState,
    pub dependencies: Vec<ComponentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
}

/// Read-only view of the scheduler for tooling; there is no mutation path back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapSnapshot {
    pub in_progress: bool,
    pub run: RunId,
    pub tick: u64,
    pub complete: bool,
    pub progress: Progress,
    pub components: Vec<ComponentStatus>,
    pub guards: Vec<ArmedGuard>,
    pub timers: Vec<TimerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<BootstrapOutcome>,
}

impl BootstrapSnapshot {
    pub fn component(&self, id: &str) -> Option<&ComponentStatus> {
        self.components.iter().find(|c| c.id.as_str() == id)
    }
}
