use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::kernel::component::ComponentId;
use crate::kernel::error::{Error, Result};

/// Identifier of a bootstrap run; incremented by every `start_bootstrap`
pub type RunId = u64;

/// Why a component ended up `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The component reported failure through its completer
    Reported(String),
    /// `start` returned an error or panicked at the dispatch boundary
    StartError(String),
    /// The timeout guard fired before the component reported
    Timeout(Duration),
}

impl FailureReason {
    /// Typed error for logging against the failing component
    pub fn to_error(&self, component: &ComponentId) -> Error {
        match self {
            FailureReason::Reported(message) | FailureReason::StartError(message) => {
                Error::ComponentStartFailure {
                    component: component.clone(),
                    message: message.clone(),
                }
            }
            FailureReason::Timeout(after) => Error::ComponentTimeout {
                component: component.clone(),
                after: *after,
            },
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Reported(msg) => write!(f, "reported failure: {}", msg),
            FailureReason::StartError(msg) => write!(f, "start error: {}", msg),
            FailureReason::Timeout(after) => write!(f, "timeout after {:?}", after),
        }
    }
}

/// Result carried by a completion message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(FailureReason),
}

/// Message applied by the scheduler at the next tick boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMessage {
    pub run: RunId,
    pub component: ComponentId,
    pub outcome: Outcome,
}

impl CompletionMessage {
    pub fn success(run: RunId, component: ComponentId) -> Self {
        Self { run, component, outcome: Outcome::Success }
    }

    pub fn failure(run: RunId, component: ComponentId, reason: FailureReason) -> Self {
        Self { run, component, outcome: Outcome::Failure(reason) }
    }
}

/// Single-shot completion callback handed to [`Component::start`](crate::kernel::Component::start).
///
/// Every method consumes the completer, so a component can report at most once.
/// Reports are tagged with the run they were issued for; the scheduler drops
/// reports addressed to an older run.
#[derive(Debug)]
pub struct Completer {
    run: RunId,
    component: ComponentId,
    tx: UnboundedSender<CompletionMessage>,
}

impl Completer {
    pub(crate) fn new(run: RunId, component: ComponentId, tx: UnboundedSender<CompletionMessage>) -> Self {
        Self { run, component, tx }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    /// Report successful initialization
    pub fn succeed(self) {
        let message = CompletionMessage::success(self.run, self.component.clone());
        self.send(message);
    }

    /// Report failed initialization
    pub fn fail(self, message: impl Into<String>) {
        let message = CompletionMessage::failure(
            self.run,
            self.component.clone(),
            FailureReason::Reported(message.into()),
        );
        self.send(message);
    }

    /// Report the result of an initialization routine
    pub fn complete(self, result: Result<()>) {
        match result {
            Ok(()) => self.succeed(),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn send(self, message: CompletionMessage) {
        if self.tx.send(message).is_err() {
            log::debug!(
                "Scheduler gone; dropping completion of '{}' for run {}",
                self.component,
                self.run
            );
        }
    }
}
