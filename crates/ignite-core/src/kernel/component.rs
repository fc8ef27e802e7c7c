use std::any::Any;
use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kernel::completion::Completer;
use crate::kernel::error::{Error, Result};

/// Opaque identity of a registered component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ComponentId> for ComponentId {
    fn from(id: &ComponentId) -> Self {
        id.clone()
    }
}

// Lets maps keyed by ComponentId be queried with &str
impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Downcasting support for registered components
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A unit of startup work with a statically declared dependency set.
///
/// `start` must hand the [`Completer`] to whatever finishes the work; the
/// completer is consumed on use, so a component reports at most once. An `Err`
/// returned from `start` (or a panic) is treated as an immediate failure.
/// A completer that is dropped without reporting leaves the component to its
/// timeout guard.
pub trait Component: AsAny + Send + Sync + Debug {
    /// Identity used for registration and dependency declarations
    fn id(&self) -> ComponentId;

    /// Components that must be `Initialized` before this one is queued
    fn dependencies(&self) -> Vec<ComponentId> {
        Vec::new()
    }

    /// Begin asynchronous initialization
    fn start(&self, completer: Completer) -> Result<()>;

    /// Called once when the host game starts, before any bootstrap run
    fn on_game_start(&self) {}

    /// Called on logout, before every component is reset
    fn on_logout(&self) {}
}

/// Component whose initialization is a future instead of a callback
#[async_trait]
pub trait AsyncComponent: Send + Sync + Debug + 'static {
    fn id(&self) -> ComponentId;

    fn dependencies(&self) -> Vec<ComponentId> {
        Vec::new()
    }

    async fn initialize(&self) -> Result<()>;

    fn on_game_start(&self) {}

    fn on_logout(&self) {}
}

/// Adapts an [`AsyncComponent`] to the callback contract by spawning its
/// `initialize` future on the current tokio runtime.
#[derive(Debug)]
pub struct Spawned<C: AsyncComponent> {
    inner: Arc<C>,
}

impl<C: AsyncComponent> Spawned<C> {
    pub fn new(component: C) -> Self {
        Self {
            inner: Arc::new(component),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: AsyncComponent> Component for Spawned<C> {
    fn id(&self) -> ComponentId {
        self.inner.id()
    }

    fn dependencies(&self) -> Vec<ComponentId> {
        self.inner.dependencies()
    }

    fn start(&self, completer: Completer) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Other(format!("No tokio runtime available to spawn '{}': {}", self.inner.id(), e)))?;
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            let result = inner.initialize().await;
            completer.complete(result);
        });
        Ok(())
    }

    fn on_game_start(&self) {
        self.inner.on_game_start()
    }

    fn on_logout(&self) {
        self.inner.on_logout()
    }
}
