use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::BootstrapConfig;
use crate::event::{ListenerId, TransitionEvent, TransitionListeners};
use crate::host::{HostHook, ScriptHost};
use crate::kernel::aggregator::{BootstrapOutcome, CompletionAggregator, Progress};
use crate::kernel::completion::{Completer, CompletionMessage, FailureReason, Outcome, RunId};
use crate::kernel::component::{Component, ComponentId};
use crate::kernel::constants;
use crate::kernel::error::{panic_message, Error, Result};
use crate::kernel::snapshot::{BootstrapSnapshot, ComponentStatus};
use crate::registry::{resolver, ComponentRegistry, LifecycleState, StateTracker};
use crate::timer::{DelayFacility, TimeoutGuard};

/// What a single [`BootstrapScheduler::tick`] did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickReport {
    pub run: RunId,
    /// Tick number within the run, starting at 1
    pub tick: u64,
    /// Completion and timeout messages applied
    pub processed: usize,
    /// Components moved to `Initializing`
    pub dispatched: usize,
    /// Set on the tick that ended the run
    pub finished: Option<BootstrapOutcome>,
}

/// Drives bootstrap runs over a fixed component set.
///
/// The scheduler is single-threaded and cooperative: the host calls
/// [`tick`](Self::tick) once per frame. Components report through a
/// [`Completer`] from any thread or task; reports and timeout expiries are
/// queued on a channel and applied at the next tick boundary, so lifecycle
/// state is only ever mutated from `tick`.
pub struct BootstrapScheduler {
    config: BootstrapConfig,
    registry: ComponentRegistry,
    states: StateTracker,
    queue: VecDeque<ComponentId>,
    guards: TimeoutGuard,
    failures: HashMap<ComponentId, FailureReason>,
    run: RunId,
    active: bool,
    ticks: u64,
    aggregator: CompletionAggregator,
    listeners: TransitionListeners,
    tx: UnboundedSender<CompletionMessage>,
    rx: UnboundedReceiver<CompletionMessage>,
    last_outcome: Option<BootstrapOutcome>,
}

impl std::fmt::Debug for BootstrapScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapScheduler")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("run", &self.run)
            .field("active", &self.active)
            .field("queued", &self.queue.len())
            .field("guards", &self.guards)
            .finish()
    }
}

impl BootstrapScheduler {
    pub fn new(
        config: BootstrapConfig,
        delay: Arc<dyn DelayFacility>,
        host: Arc<dyn ScriptHost>,
    ) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating {} v{} scheduler (batch cap {}, timeout {:?})",
            constants::APP_NAME,
            constants::APP_VERSION,
            config.batch_cap,
            config.timeout()
        );
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            registry: ComponentRegistry::new().with_cycle_check(config.reject_cycles),
            states: StateTracker::new(),
            queue: VecDeque::new(),
            guards: TimeoutGuard::new(delay, config.timeout()),
            failures: HashMap::new(),
            run: 0,
            active: false,
            ticks: 0,
            aggregator: CompletionAggregator::new(host),
            listeners: TransitionListeners::new(),
            tx,
            rx,
            last_outcome: None,
            config,
        })
    }

    /// Register a component; only allowed before the first run starts
    pub fn register(&mut self, component: Arc<dyn Component>) -> Result<ComponentId> {
        let id = self.registry.register(component)?;
        self.states.track(id.clone());
        Ok(id)
    }

    /// Begin a run and seed every component without dependencies.
    ///
    /// Dispatch starts on the next [`tick`](Self::tick). `on_all_complete` is
    /// invoked exactly once when the run terminates, complete or not.
    pub fn start_bootstrap<F>(&mut self, on_all_complete: F) -> Result<RunId>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.active {
            log::warn!("Bootstrap start rejected: run {} is still in progress", self.run);
            return Err(Error::BootstrapAlreadyInProgress);
        }

        self.registry.seal();
        self.active = true;
        self.run += 1;
        self.ticks = 0;
        self.states.reset_all();
        self.queue.clear();
        self.failures.clear();
        self.guards.clear();
        self.last_outcome = None;
        self.aggregator.arm(self.run, Box::new(on_all_complete));

        let seeded = self.enqueue_eligible()?;
        log::info!(
            "Bootstrap run {} started: {} components registered, {} seeded",
            self.run,
            self.registry.len(),
            seeded
        );
        Ok(self.run)
    }

    /// Start a run after a reconnect; the host hears `Reconnect` before `on_complete` runs
    pub fn reconnect<F>(&mut self, on_complete: F) -> Result<RunId>
    where
        F: FnOnce() + Send + 'static,
    {
        log::info!("Reconnect requested; restarting bootstrap");
        let host = Arc::clone(self.aggregator.host());
        self.start_bootstrap(move || {
            host.notify(HostHook::Reconnect);
            on_complete();
        })
    }

    /// Run one scheduling quantum: apply reports, dispatch a batch, check termination
    pub fn tick(&mut self) -> TickReport {
        if !self.active {
            while let Ok(message) = self.rx.try_recv() {
                log::debug!(
                    "No run in progress; dropping report for '{}' (run {})",
                    message.component,
                    message.run
                );
            }
            return TickReport {
                run: self.run,
                tick: self.ticks,
                ..TickReport::default()
            };
        }

        self.ticks += 1;
        let processed = self.drain_completions();
        let dispatched = self.dispatch_batch();

        let finished = if self.queue.is_empty() && self.states.count(LifecycleState::Initializing) == 0 {
            Some(self.finish_run())
        } else {
            None
        };

        TickReport {
            run: self.run,
            tick: self.ticks,
            processed,
            dispatched,
            finished,
        }
    }

    fn drain_completions(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(message) = self.rx.try_recv() {
            if message.run != self.run {
                log::debug!(
                    "Ignoring stale report for '{}' from run {} (current run {})",
                    message.component,
                    message.run,
                    self.run
                );
                continue;
            }
            let state = self.states.state_of(message.component.as_str());
            if !self.states.is_tracked(message.component.as_str()) || state != LifecycleState::Initializing {
                log::debug!(
                    "Ignoring report for '{}' in state {} ({:?})",
                    message.component,
                    state,
                    message.outcome
                );
                continue;
            }

            let applied = match message.outcome {
                Outcome::Success => self.on_component_success(&message.component),
                Outcome::Failure(reason) => self.on_component_failure(&message.component, reason),
            };
            match applied {
                Ok(()) => processed += 1,
                Err(e) => log::error!("Failed to apply report for '{}': {}", message.component, e),
            }
        }
        processed
    }

    fn dispatch_batch(&mut self) -> usize {
        let mut dispatched = 0;
        while dispatched < self.config.batch_cap {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            match self.start_component(&id) {
                Ok(()) => dispatched += 1,
                Err(e) => log::error!("Failed to dispatch '{}': {}", id, e),
            }
        }
        if dispatched > 0 {
            log::debug!(
                "Tick {} of run {}: dispatched {} ({} still queued)",
                self.ticks,
                self.run,
                dispatched,
                self.queue.len()
            );
        }
        dispatched
    }

    fn start_component(&mut self, id: &ComponentId) -> Result<()> {
        let component = self
            .registry
            .component(id.as_str())
            .cloned()
            .ok_or_else(|| Error::UnknownComponent { component: id.clone() })?;

        let from = self.states.transition(id.as_str(), LifecycleState::Initializing)?;
        self.emit(id, from, LifecycleState::Initializing, None);

        let run = self.run;
        let after = self.guards.duration();
        let expiry_tx = self.tx.clone();
        let expired = id.clone();
        self.guards.arm(id.clone(), run, move || {
            let message = CompletionMessage::failure(run, expired, FailureReason::Timeout(after));
            if expiry_tx.send(message).is_err() {
                log::debug!("Scheduler gone; dropping timeout expiry for run {}", run);
            }
        });

        log::info!("Starting component '{}'", id);
        let completer = Completer::new(run, id.clone(), self.tx.clone());
        let started = panic::catch_unwind(AssertUnwindSafe(|| component.start(completer)));
        let reason = match started {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => FailureReason::StartError(e.to_string()),
            Err(payload) => FailureReason::StartError(format!("panicked: {}", panic_message(&*payload))),
        };
        self.on_component_failure(id, reason)
    }

    fn on_component_success(&mut self, id: &ComponentId) -> Result<()> {
        self.guards.disarm(id.as_str());
        let from = self.states.transition(id.as_str(), LifecycleState::Initialized)?;
        log::info!("Component '{}' initialized", id);
        self.emit(id, from, LifecycleState::Initialized, None);

        let unlocked = self.enqueue_eligible()?;
        if unlocked > 0 {
            log::debug!("'{}' unlocked {} component(s)", id, unlocked);
        }
        Ok(())
    }

    fn on_component_failure(&mut self, id: &ComponentId, reason: FailureReason) -> Result<()> {
        self.guards.disarm(id.as_str());
        let from = self.states.transition(id.as_str(), LifecycleState::Failed)?;
        // Timeouts render as ComponentTimeout ("timed out after ...")
        log::error!("{}", reason.to_error(id));
        self.failures.insert(id.clone(), reason.clone());
        self.emit(id, from, LifecycleState::Failed, Some(reason));
        Ok(())
    }

    /// Queue every newly eligible component, returning how many were queued
    fn enqueue_eligible(&mut self) -> Result<usize> {
        let eligible = resolver::eligible(&self.registry, &self.states);
        let count = eligible.len();
        for id in eligible {
            let from = self.states.transition(id.as_str(), LifecycleState::Queued)?;
            log::debug!("Queued component '{}'", id);
            self.emit(&id, from, LifecycleState::Queued, None);
            self.queue.push_back(id);
        }
        Ok(count)
    }

    fn finish_run(&mut self) -> BootstrapOutcome {
        self.active = false;
        self.guards.clear();

        let progress = self.progress();
        let outcome = if progress.is_complete() {
            log::info!(
                "Bootstrap run {} complete: {} components initialized in {} ticks",
                self.run,
                progress.total,
                self.ticks
            );
            BootstrapOutcome::Complete {
                run: self.run,
                total: progress.total,
                ticks: self.ticks,
            }
        } else {
            let blocked = resolver::diagnose(&self.registry, &self.states);
            log::error!(
                "{}",
                Error::IncompleteBootstrap {
                    initialized: progress.initialized,
                    total: progress.total,
                }
            );
            for id in self.registry.ids() {
                if let Some(reason) = self.failures.get(id.as_str()) {
                    log::warn!("'{}' failed: {}", id, reason);
                }
            }
            for entry in &blocked {
                log::warn!("{}", entry);
            }
            BootstrapOutcome::Incomplete {
                run: self.run,
                initialized: progress.initialized,
                failed: progress.failed,
                total: progress.total,
                ticks: self.ticks,
                blocked,
            }
        };

        self.last_outcome = Some(outcome.clone());
        self.aggregator.on_run_finished(self.run);
        outcome
    }

    fn emit(&self, id: &ComponentId, from: LifecycleState, to: LifecycleState, reason: Option<FailureReason>) {
        if self.listeners.is_empty() {
            return;
        }
        let event = TransitionEvent {
            run: self.run,
            component: id.clone(),
            from,
            to,
            reason,
        };
        self.listeners.emit(&event);
    }

    /// Notify every component, then the scripting host, that the game started
    pub fn on_game_start(&self) {
        for component in self.registry.components() {
            component.on_game_start();
        }
        self.aggregator.host().notify(HostHook::GameStart);
    }

    /// Tear down after logout: notify components, reset every state, notify the host
    pub fn logout(&mut self) -> Result<()> {
        if self.active {
            log::warn!("Logout rejected: run {} is still in progress", self.run);
            return Err(Error::BootstrapAlreadyInProgress);
        }
        for component in self.registry.components() {
            component.on_logout();
        }
        self.states.reset_all();
        self.failures.clear();
        self.last_outcome = None;
        log::info!("Logged out; {} components reset", self.states.len());
        self.aggregator.host().notify(HostHook::Logout);
        Ok(())
    }

    /// Change the timeout guard duration for subsequent runs.
    ///
    /// Rejected while a run is active; guards already armed keep their deadline.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        if self.active {
            log::warn!("Timeout change rejected: run {} is still in progress", self.run);
            return Err(Error::BootstrapAlreadyInProgress);
        }
        let config = self.config.clone().with_timeout(timeout);
        config.validate()?;
        self.guards.set_duration(config.timeout());
        log::info!("Timeout guard set to {:?} for the next run", config.timeout());
        self.config = config;
        Ok(())
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn is_bootstrap_in_progress(&self) -> bool {
        self.active
    }

    /// Every registered component is `Initialized`
    pub fn is_complete(&self) -> bool {
        self.progress().is_complete()
    }

    pub fn state_of(&self, id: &str) -> LifecycleState {
        self.states.state_of(id)
    }

    /// Why a component failed in the current run
    pub fn failure_of(&self, id: &str) -> Option<&FailureReason> {
        self.failures.get(id)
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.states)
    }

    pub fn last_outcome(&self) -> Option<&BootstrapOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Typed lookup of a registered component
    pub fn get_component<T: Component + 'static>(&self) -> Option<&T> {
        self.registry.get_concrete::<T>()
    }

    pub fn snapshot(&self) -> BootstrapSnapshot {
        let components = self
            .registry
            .descriptors()
            .map(|d| ComponentStatus {
                id: d.id().clone(),
                state: self.states.state_of(d.id().as_str()),
                dependencies: d.dependencies().to_vec(),
                failure: self.failures.get(d.id().as_str()).cloned(),
            })
            .collect();

        BootstrapSnapshot {
            in_progress: self.active,
            run: self.run,
            tick: self.ticks,
            complete: self.is_complete(),
            progress: self.progress(),
            components,
            guards: self.guards.armed(),
            timers: self.guards.facility().active_timers(),
            last_outcome: self.last_outcome.clone(),
        }
    }
}
