pub mod config;
pub mod event;
pub mod host;
pub mod kernel;
pub mod registry;
pub mod runtime;
pub mod timer;

// Re-export key public types/traits for easier use by the binary and components
pub use config::{BootstrapConfig, ConfigError, ConfigFormat};
pub use event::{TransitionEvent, TransitionListeners};
pub use host::{HostHook, LoggingHost, NoopHost, ScriptHost};
pub use kernel::error::Error as KernelError;
pub use kernel::{
    AsyncComponent, BootstrapOutcome, BootstrapScheduler, BootstrapSnapshot, Completer, Component,
    ComponentId, FailureReason, Progress, RunId, Spawned,
};
pub use registry::{ComponentDescriptor, ComponentRegistry, LifecycleState, StateTracker};
pub use runtime::FrameLoop;
pub use timer::{DelayFacility, TimeoutGuard, TimerHandle, TimerManager, TokioDelay};
