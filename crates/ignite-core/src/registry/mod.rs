//! # Component Registry, State Tracker and Dependency Resolver
//!
//! The registry holds the fixed set of components and their statically
//! declared dependencies. The [`StateTracker`] is the single source of truth
//! for "is X ready", and the [`resolver`] computes which components may be
//! queued next from a tracker snapshot.
pub mod components;
pub mod resolver;
pub mod state;

pub use components::{ComponentDescriptor, ComponentRegistry};
pub use resolver::{BlockReason, BlockedComponent};
pub use state::{LifecycleState, StateTracker};

// Test module declaration
#[cfg(test)]
mod tests;
