//! # Ignite Core Kernel Errors
//!
//! Defines the error taxonomy of the bootstrap scheduler.
//!
//! Only registration-time errors and a second `start_bootstrap` call are
//! surfaced synchronously to callers. Per-component failures
//! ([`Error::ComponentStartFailure`], [`Error::ComponentTimeout`]) are converted
//! to lifecycle state at the dispatch boundary and only ever appear in logs,
//! transition events and snapshots.
use std::result::Result as StdResult;
use std::time::Duration;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::kernel::component::ComponentId;
use crate::registry::LifecycleState;

/// Kernel error type
#[derive(Debug, ThisError)]
pub enum Error {
    /// A component with the same identity is already registered
    #[error("Component '{component}' is already registered")]
    DuplicateRegistration { component: ComponentId },

    /// Registration attempted after a bootstrap run has started
    #[error("Cannot register component '{component}': registration closes once bootstrap has started")]
    RegistrationClosed { component: ComponentId },

    /// Strict registration refused a component that would close a cycle
    #[error("Registering component '{component}' would close a dependency cycle: {}", join_ids(.cycle))]
    DependencyCycle {
        component: ComponentId,
        cycle: Vec<ComponentId>,
    },

    /// `start_bootstrap` called while a run is active
    #[error("A bootstrap run is already in progress")]
    BootstrapAlreadyInProgress,

    /// A component's start returned an error, panicked, or reported failure
    #[error("Component '{component}' failed to initialize: {message}")]
    ComponentStartFailure {
        component: ComponentId,
        message: String,
    },

    /// The timeout guard of a component expired
    #[error("Component '{component}' initialization timed out after {after:?}")]
    ComponentTimeout {
        component: ComponentId,
        after: Duration,
    },

    /// A run terminated with at least one component not initialized
    #[error("Bootstrap incomplete: {initialized}/{total} components initialized")]
    IncompleteBootstrap { initialized: usize, total: usize },

    /// A lifecycle transition outside the legal edges was requested
    #[error("Illegal lifecycle transition for '{component}': {from} -> {to}")]
    InvalidTransition {
        component: ComponentId,
        from: LifecycleState,
        to: LifecycleState,
    },

    /// The component is not known to the registry
    #[error("Component '{component}' is not registered")]
    UnknownComponent { component: ComponentId },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

pub(crate) fn join_ids(ids: &[ComponentId]) -> String {
    ids.iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
