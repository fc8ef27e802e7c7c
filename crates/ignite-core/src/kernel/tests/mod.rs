#[cfg(test)]
mod error_tests;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::BootstrapConfig;
use crate::host::{HostHook, ScriptHost};
use crate::kernel::bootstrap::BootstrapScheduler;
use crate::kernel::completion::Completer;
use crate::kernel::component::{Component, ComponentId};
use crate::kernel::error::{Error, Result};
use crate::kernel::BootstrapOutcome;
use crate::timer::TimerManager;

pub(crate) const FRAME: Duration = Duration::from_millis(16);

/// How a [`Probe`] reacts to `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Script {
    Succeed,
    Fail,
    StartError,
    Panic,
    /// Drop the completer without reporting
    Hang,
    /// Keep the completer for the test to use
    Defer,
}

/// Test component that records its starts and follows a script
#[derive(Debug)]
pub(crate) struct Probe {
    id: ComponentId,
    deps: Vec<ComponentId>,
    script: Script,
    starts: AtomicUsize,
    game_starts: AtomicUsize,
    logouts: AtomicUsize,
    held: Mutex<Vec<Completer>>,
    start_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl Probe {
    pub(crate) fn new(id: &str, deps: &[&str], script: Script) -> Arc<Self> {
        Arc::new(Self::build(id, deps, script, None))
    }

    pub(crate) fn logged(id: &str, deps: &[&str], script: Script, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self::build(id, deps, script, Some(Arc::clone(log))))
    }

    fn build(id: &str, deps: &[&str], script: Script, start_log: Option<Arc<Mutex<Vec<String>>>>) -> Self {
        Self {
            id: ComponentId::from(id),
            deps: deps.iter().map(|d| ComponentId::from(*d)).collect(),
            script,
            starts: AtomicUsize::new(0),
            game_starts: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            held: Mutex::new(Vec::new()),
            start_log,
        }
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn game_starts(&self) -> usize {
        self.game_starts.load(Ordering::SeqCst)
    }

    pub(crate) fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    /// Oldest completer kept by a `Defer` probe
    pub(crate) fn take_completer(&self) -> Completer {
        let mut held = self.held.lock().unwrap();
        assert!(!held.is_empty(), "probe '{}' holds no completer", self.id);
        held.remove(0)
    }
}

impl Component for Probe {
    fn id(&self) -> ComponentId {
        self.id.clone()
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        self.deps.clone()
    }

    fn start(&self, completer: Completer) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.start_log {
            log.lock().unwrap().push(self.id.to_string());
        }
        match self.script {
            Script::Succeed => completer.succeed(),
            Script::Fail => completer.fail("boom"),
            Script::StartError => return Err(Error::Other("bad wiring".to_string())),
            Script::Panic => panic!("probe '{}' exploded", self.id),
            Script::Hang => drop(completer),
            Script::Defer => self.held.lock().unwrap().push(completer),
        }
        Ok(())
    }

    fn on_game_start(&self) {
        self.game_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_logout(&self) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Script host that records every hook it receives
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    hooks: Mutex<Vec<HostHook>>,
}

impl RecordingHost {
    pub(crate) fn hooks(&self) -> Vec<HostHook> {
        self.hooks.lock().unwrap().clone()
    }
}

impl ScriptHost for RecordingHost {
    fn notify(&self, hook: HostHook) {
        self.hooks.lock().unwrap().push(hook);
    }
}

pub(crate) fn scheduler_with(config: BootstrapConfig) -> (BootstrapScheduler, Arc<TimerManager>, Arc<RecordingHost>) {
    let timers = Arc::new(TimerManager::new());
    let host = Arc::new(RecordingHost::default());
    let scheduler = BootstrapScheduler::new(config, timers.clone(), host.clone()).expect("scheduler should build");
    (scheduler, timers, host)
}

pub(crate) fn scheduler() -> (BootstrapScheduler, Arc<TimerManager>, Arc<RecordingHost>) {
    scheduler_with(BootstrapConfig::default())
}

/// Counter bumped by a completion callback
pub(crate) fn counting_callback() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);
    (calls, move || {
        calls_clone.fetch_add(1, Ordering::SeqCst);
    })
}

/// Advance frames and tick until the active run finishes
pub(crate) fn run_to_end(scheduler: &mut BootstrapScheduler, timers: &TimerManager) -> BootstrapOutcome {
    for _ in 0..10_000 {
        timers.update(FRAME);
        if let Some(outcome) = scheduler.tick().finished {
            return outcome;
        }
    }
    panic!("bootstrap run did not terminate");
}
