//! # Scripting-host bridge
//!
//! The scripting host is an external collaborator. The scheduler only tells it
//! that a well-known lifecycle point was reached; no payload is carried.
use std::fmt;

/// Lifecycle points announced to the scripting host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostHook {
    /// The game started, before any bootstrap run
    GameStart,
    /// A bootstrap run finished (fully or partially)
    BootstrapFinished,
    /// A reconnect-triggered run finished
    Reconnect,
    /// The player logged out and every component was reset
    Logout,
}

impl HostHook {
    /// Name of the host-side function for this hook
    pub fn function_name(self) -> &'static str {
        match self {
            HostHook::GameStart => "OnGameStart",
            HostHook::BootstrapFinished => "OnControllerInitialized",
            HostHook::Reconnect => "OnReconnect",
            HostHook::Logout => "OnLogout",
        }
    }
}

impl fmt::Display for HostHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.function_name())
    }
}

/// Receiver of host hooks
pub trait ScriptHost: Send + Sync + fmt::Debug {
    fn notify(&self, hook: HostHook);
}

/// Host that only logs the hooks it receives
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHost;

impl ScriptHost for LoggingHost {
    fn notify(&self, hook: HostHook) {
        log::info!("Script host hook: {}", hook);
    }
}

/// Host that ignores every hook
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl ScriptHost for NoopHost {
    fn notify(&self, _hook: HostHook) {}
}
