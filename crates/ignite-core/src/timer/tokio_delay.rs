use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::kernel::error::{Error, Result};
use crate::timer::{duration_ms, DelayFacility, TimerCallback, TimerHandle, TimerInfo};

#[derive(Debug)]
struct PendingTimer {
    deadline: Instant,
    abort: AbortHandle,
}

type PendingMap = Arc<Mutex<HashMap<u64, PendingTimer>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<u64, PendingTimer>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delay facility backed by tokio timers.
///
/// Each scheduled callback is a spawned task sleeping until its deadline. A
/// callback only runs if its task still finds its entry in the pending table,
/// and `cancel` removes that entry, so firing and canceling never both succeed.
#[derive(Debug)]
pub struct TokioDelay {
    runtime: Handle,
    next_id: AtomicU64,
    pending: PendingMap,
}

impl TokioDelay {
    /// Use the runtime of the calling context
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::Other(format!("TokioDelay requires a tokio runtime: {}", e)))?;
        Ok(Self::with_handle(runtime))
    }

    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl DelayFacility for TokioDelay {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + delay;
        let pending = Arc::clone(&self.pending);

        // Hold the table while spawning so the task cannot look itself up before it is inserted
        let mut table = lock(&self.pending);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let claimed = lock(&pending).remove(&id).is_some();
            if claimed {
                callback();
            }
        });
        table.insert(
            id,
            PendingTimer {
                deadline,
                abort: task.abort_handle(),
            },
        );
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match lock(&self.pending).remove(&handle.id()) {
            Some(timer) => {
                timer.abort.abort();
                true
            }
            None => false,
        }
    }

    fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        lock(&self.pending)
            .get(&handle.id())
            .map(|t| t.deadline.saturating_duration_since(Instant::now()))
    }

    fn active_timers(&self) -> Vec<TimerInfo> {
        let now = Instant::now();
        let mut timers: Vec<TimerInfo> = lock(&self.pending)
            .iter()
            .map(|(id, t)| TimerInfo {
                handle: TimerHandle::new(*id),
                remaining_ms: duration_ms(t.deadline.saturating_duration_since(now)),
                repeating: false,
            })
            .collect();
        timers.sort_by_key(|t| t.handle);
        timers
    }
}
