use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::kernel::component::{Component, ComponentId};
use crate::kernel::error::{Error, Result};
use crate::registry::resolver;

/// Identity plus ordered dependency set, fixed at registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescriptor {
    id: ComponentId,
    dependencies: Vec<ComponentId>,
}

impl ComponentDescriptor {
    /// Build a descriptor; repeated dependencies keep their first position
    pub fn new<I, D>(id: impl Into<ComponentId>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<ComponentId>,
    {
        let mut deps: Vec<ComponentId> = Vec::new();
        for dep in dependencies {
            let dep = dep.into();
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        Self {
            id: id.into(),
            dependencies: deps,
        }
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn dependencies(&self) -> &[ComponentId] {
        &self.dependencies
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d.as_str() == id)
    }
}

struct Entry {
    descriptor: ComponentDescriptor,
    component: Arc<dyn Component>,
}

/// Registry of the fixed component set, in registration order
pub struct ComponentRegistry {
    entries: Vec<Entry>,
    index: HashMap<ComponentId, usize>,
    sealed: bool,
    reject_cycles: bool,
}

// Manual Debug implementation
impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.entries.iter().map(|e| e.descriptor.id.as_str()).collect();
        f.debug_struct("ComponentRegistry")
            .field("components", &ids)
            .field("sealed", &self.sealed)
            .field("reject_cycles", &self.reject_cycles)
            .finish()
    }
}

impl ComponentRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            sealed: false,
            reject_cycles: false,
        }
    }

    /// Refuse registrations that would close a dependency cycle
    pub fn with_cycle_check(mut self, reject_cycles: bool) -> Self {
        self.reject_cycles = reject_cycles;
        self
    }

    /// Register a component, reading its identity and dependencies once
    pub fn register(&mut self, component: Arc<dyn Component>) -> Result<ComponentId> {
        let descriptor = ComponentDescriptor::new(component.id(), component.dependencies());
        let id = descriptor.id.clone();

        if self.sealed {
            log::warn!("Rejected registration of '{}': bootstrap has already started", id);
            return Err(Error::RegistrationClosed { component: id });
        }
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateRegistration { component: id });
        }
        if self.reject_cycles {
            let candidate = self.descriptors().chain(std::iter::once(&descriptor));
            if let Some(cycle) = resolver::cycle_through(candidate, id.as_str()) {
                return Err(Error::DependencyCycle { component: id, cycle });
            }
        }

        log::debug!(
            "Registered component '{}' (depends on: [{}])",
            id,
            descriptor.dependencies.iter().map(ComponentId::as_str).collect::<Vec<_>>().join(", ")
        );
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(Entry { descriptor, component });
        Ok(id)
    }

    /// Close registration; called when the first bootstrap run starts
    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.index.get(id).map(|i| &self.entries[*i].descriptor)
    }

    pub fn component(&self, id: &str) -> Option<&Arc<dyn Component>> {
        self.index.get(id).map(|i| &self.entries[*i].component)
    }

    /// Get a component by its concrete type
    pub fn get_concrete<T: Component + 'static>(&self) -> Option<&T> {
        self.entries.iter().find_map(|e| {
            let component: &dyn Component = e.component.as_ref();
            component.as_any().downcast_ref::<T>()
        })
    }

    /// All descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Owned copy of every descriptor in registration order
    pub fn all(&self) -> Vec<ComponentDescriptor> {
        self.descriptors().cloned().collect()
    }

    /// All component instances in registration order
    pub fn components(&self) -> impl Iterator<Item = &Arc<dyn Component>> {
        self.entries.iter().map(|e| &e.component)
    }

    pub fn ids(&self) -> Vec<ComponentId> {
        self.descriptors().map(|d| d.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
