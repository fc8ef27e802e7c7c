//! Eligibility resolution over a state snapshot.
//!
//! [`eligible`] performs no cycle detection: components on a cycle simply never
//! become eligible and the run ends with them `UnInitialized`. The cycle
//! helpers below are only used for diagnostics and for the opt-in strict
//! registration mode.
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::kernel::component::ComponentId;
use crate::kernel::error::join_ids;
use crate::registry::components::{ComponentDescriptor, ComponentRegistry};
use crate::registry::state::{LifecycleState, StateTracker};

/// Every `UnInitialized` component whose dependencies are all `Initialized`,
/// in registration order
pub fn eligible(registry: &ComponentRegistry, tracker: &StateTracker) -> Vec<ComponentId> {
    registry
        .descriptors()
        .filter(|d| tracker.state_of(d.id().as_str()) == LifecycleState::UnInitialized)
        .filter(|d| dependencies_satisfied(d, tracker))
        .map(|d| d.id().clone())
        .collect()
}

/// An unregistered dependency reads as `UnInitialized` and is never satisfied
pub fn dependencies_satisfied(descriptor: &ComponentDescriptor, tracker: &StateTracker) -> bool {
    descriptor.dependencies().iter().all(|dep| {
        tracker.is_tracked(dep.as_str()) && tracker.state_of(dep.as_str()) == LifecycleState::Initialized
    })
}

/// Find a dependency path leading from `start` back to itself.
///
/// The returned path begins and ends with `start`, e.g. `a -> b -> a`.
pub fn cycle_through<'a, I>(descriptors: I, start: &str) -> Option<Vec<ComponentId>>
where
    I: IntoIterator<Item = &'a ComponentDescriptor>,
{
    let graph: HashMap<&'a str, &'a [ComponentId]> = descriptors
        .into_iter()
        .map(|d| (d.id().as_str(), d.dependencies()))
        .collect();

    let mut visited = HashSet::new();
    let mut path = Vec::new();
    if !visit(&graph, start, start, &mut visited, &mut path) {
        return None;
    }

    let mut cycle = Vec::with_capacity(path.len() + 2);
    cycle.push(ComponentId::from(start));
    cycle.extend(path.into_iter().map(ComponentId::from));
    cycle.push(ComponentId::from(start));
    Some(cycle)
}

/// DFS along dependency edges looking for `target` (internal helper)
fn visit<'a>(
    graph: &HashMap<&'a str, &'a [ComponentId]>,
    node: &str,
    target: &str,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> bool {
    let Some(deps) = graph.get(node).copied() else {
        return false;
    };
    for dep in deps {
        let dep = dep.as_str();
        if dep == target {
            return true;
        }
        if visited.insert(dep) {
            path.push(dep);
            if visit(graph, dep, target, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

/// First dependency cycle in the registry, if any
pub fn find_cycle(registry: &ComponentRegistry) -> Option<Vec<ComponentId>> {
    registry
        .descriptors()
        .find_map(|d| cycle_through(registry.descriptors(), d.id().as_str()))
}

/// Why a component was never queued
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum BlockReason {
    /// Depends on a component that is not registered
    MissingDependency(ComponentId),
    /// Depends on a component that failed in this run
    FailedDependency(ComponentId),
    /// Sits on a dependency cycle
    DependencyCycle(Vec<ComponentId>),
    /// Waits on a dependency that is itself blocked or still running
    PendingDependency(ComponentId),
    /// Dependencies are satisfied but the component was not queued yet
    Ready,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::MissingDependency(dep) => write!(f, "dependency '{}' is not registered", dep),
            BlockReason::FailedDependency(dep) => write!(f, "dependency '{}' failed", dep),
            BlockReason::DependencyCycle(cycle) => write!(f, "dependency cycle {}", join_ids(cycle)),
            BlockReason::PendingDependency(dep) => write!(f, "waiting on '{}'", dep),
            BlockReason::Ready => write!(f, "ready but not queued"),
        }
    }
}

/// A component left `UnInitialized` together with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedComponent {
    pub component: ComponentId,
    pub reason: BlockReason,
}

impl fmt::Display for BlockedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' blocked: {}", self.component, self.reason)
    }
}

/// Explain every `UnInitialized` component, in registration order
pub fn diagnose(registry: &ComponentRegistry, tracker: &StateTracker) -> Vec<BlockedComponent> {
    registry
        .descriptors()
        .filter(|d| tracker.state_of(d.id().as_str()) == LifecycleState::UnInitialized)
        .map(|d| BlockedComponent {
            component: d.id().clone(),
            reason: block_reason(registry, tracker, d),
        })
        .collect()
}

fn block_reason(registry: &ComponentRegistry, tracker: &StateTracker, descriptor: &ComponentDescriptor) -> BlockReason {
    let deps = descriptor.dependencies();
    if let Some(dep) = deps.iter().find(|dep| !registry.contains(dep.as_str())) {
        return BlockReason::MissingDependency(dep.clone());
    }
    if let Some(dep) = deps
        .iter()
        .find(|dep| tracker.state_of(dep.as_str()) == LifecycleState::Failed)
    {
        return BlockReason::FailedDependency(dep.clone());
    }
    if let Some(cycle) = cycle_through(registry.descriptors(), descriptor.id().as_str()) {
        return BlockReason::DependencyCycle(cycle);
    }
    match deps
        .iter()
        .find(|dep| tracker.state_of(dep.as_str()) != LifecycleState::Initialized)
    {
        Some(dep) => BlockReason::PendingDependency(dep.clone()),
        None => BlockReason::Ready,
    }
}
