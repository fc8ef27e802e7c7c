//! # Ignite Core Kernel
//!
//! The `kernel` module owns the bootstrap run. It defines the contract every
//! startup component implements and the scheduler that drives a run from seed
//! to termination.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Component contract**: [`Component`](component::Component) and its async
//!   adapter [`Spawned`](component::Spawned), plus the single-shot
//!   [`Completer`](completion::Completer) handed to every `start` call.
//! - **Scheduler loop**: [`BootstrapScheduler`](bootstrap::BootstrapScheduler)
//!   seeds eligible components, dispatches bounded batches per tick, supervises
//!   timeouts and converges the run.
//! - **Completion aggregation**: [`CompletionAggregator`](aggregator::CompletionAggregator)
//!   and the read-only [`Progress`](aggregator::Progress) projection.
//! - **Error Handling**: kernel error types ([`Error`](error::Error)) and
//!   a `Result` type alias in the `error` submodule.
pub mod aggregator;
pub mod bootstrap;
pub mod completion;
pub mod component;
pub mod constants;
pub mod error;
pub mod snapshot;

pub use aggregator::{BootstrapOutcome, CompletionAggregator, Progress};
pub use bootstrap::{BootstrapScheduler, TickReport};
pub use completion::{Completer, CompletionMessage, FailureReason, Outcome, RunId};
pub use component::{AsyncComponent, Component, ComponentId, Spawned};
pub use error::{Error, Result};
pub use snapshot::{BootstrapSnapshot, ComponentStatus};

// Test module declaration
#[cfg(test)]
mod tests;
