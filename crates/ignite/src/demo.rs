use std::sync::Arc;

use ignite_core::{Completer, Component, ComponentId, KernelError, TimerManager};

use crate::manifest::{Behavior, ComponentSpec};

/// Component whose initialization is a delay on the virtual clock
#[derive(Debug)]
pub struct SimulatedComponent {
    spec: ComponentSpec,
    timers: Arc<TimerManager>,
}

impl SimulatedComponent {
    pub fn new(spec: ComponentSpec, timers: Arc<TimerManager>) -> Self {
        Self { spec, timers }
    }
}

impl Component for SimulatedComponent {
    fn id(&self) -> ComponentId {
        ComponentId::from(self.spec.id.as_str())
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        self.spec.depends_on.iter().map(|d| ComponentId::from(d.as_str())).collect()
    }

    fn start(&self, completer: Completer) -> Result<(), KernelError> {
        match self.spec.behavior {
            Behavior::Succeed => {
                self.timers.delay(self.spec.delay(), move || completer.succeed());
            }
            Behavior::Fail => {
                self.timers.delay(self.spec.delay(), move || completer.fail("simulated failure"));
            }
            Behavior::Error => {
                return Err(KernelError::Other(format!("'{}' refused to start", self.spec.id)));
            }
            Behavior::Hang => {
                log::debug!("'{}' will never report", self.spec.id);
                drop(completer);
            }
        }
        Ok(())
    }

    fn on_game_start(&self) {
        log::debug!("'{}' saw game start", self.spec.id);
    }
}
