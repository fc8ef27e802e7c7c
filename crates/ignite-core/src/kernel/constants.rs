/// Application name
pub const APP_NAME: &str = "Ignite";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of components moved from `Queued` to `Initializing` per tick
pub const DEFAULT_BATCH_CAP: usize = 5;

/// Per-run timeout applied to every initializing component, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Host frame length used by the frame loop, in milliseconds
pub const DEFAULT_FRAME_MS: u64 = 16;

/// Upper bound on frames the CLI drives before giving up on a run
pub const DEFAULT_MAX_FRAMES: u64 = 1_000_000;
