use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::kernel::error::panic_message;
use crate::timer::{duration_ms, DelayFacility, TimerCallback, TimerHandle, TimerInfo};

enum TimerSlot {
    Once(TimerCallback),
    Repeating(Box<dyn FnMut() + Send + 'static>),
}

struct Timer {
    id: u64,
    due: Duration,
    interval: Option<Duration>,
    /// `None` while a repeating callback is running outside the lock
    callback: Option<TimerSlot>,
}

struct TimerState {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

/// Timer table driven by a virtual clock.
///
/// Time only moves when the host calls [`TimerManager::update`] with the frame
/// delta, so a whole bootstrap run can be simulated deterministically.
/// Callbacks run outside the internal lock and may schedule or cancel timers;
/// a timer scheduled from inside a callback fires on a later update at the
/// earliest. Panicking callbacks are logged and do not stop other timers.
pub struct TimerManager {
    state: Mutex<TimerState>,
}

impl fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("TimerManager")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .finish()
    }
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TimerState {
                now: Duration::ZERO,
                next_id: 1,
                timers: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, delay: Duration, interval: Option<Duration>, slot: TimerSlot) -> TimerHandle {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.timers.push(Timer {
            id,
            due,
            interval,
            callback: Some(slot),
        });
        TimerHandle::new(id)
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Run `callback` once after `delay` of virtual time
    pub fn delay<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.insert(delay, None, TimerSlot::Once(Box::new(callback)))
    }

    /// Run `callback` every `interval` until canceled
    pub fn add_repeating<F>(&self, interval: Duration, callback: F) -> TimerHandle
    where
        F: FnMut() + Send + 'static,
    {
        self.insert(interval, Some(interval), TimerSlot::Repeating(Box::new(callback)))
    }

    /// Advance the clock by `dt` and fire every due timer, returning how many fired.
    ///
    /// Due timers are taken one at a time, so a callback that cancels another
    /// timer due in the same update prevents it from firing.
    pub fn update(&self, dt: Duration) -> usize {
        let due = {
            let mut state = self.lock();
            state.now += dt;
            let now = state.now;
            let mut due: Vec<(Duration, u64)> = state
                .timers
                .iter()
                .filter(|t| t.due <= now && t.callback.is_some())
                .map(|t| (t.due, t.id))
                .collect();
            due.sort();
            due
        };

        let mut count = 0;
        for (_, id) in due {
            let Some(slot) = self.take_due(id) else {
                continue;
            };
            count += 1;
            match slot {
                TimerSlot::Once(callback) => run_guarded(id, callback),
                TimerSlot::Repeating(mut callback) => {
                    run_guarded(id, &mut callback);
                    let mut state = self.lock();
                    let now = state.now;
                    // Canceled while running: the entry is gone and the callback is dropped
                    if let Some(timer) = state.timers.iter_mut().find(|t| t.id == id) {
                        timer.due = now + timer.interval.unwrap_or_default();
                        timer.callback = Some(TimerSlot::Repeating(callback));
                    }
                }
            }
        }
        count
    }

    /// Remove a one-shot or borrow a repeating callback; `None` once canceled
    fn take_due(&self, id: u64) -> Option<TimerSlot> {
        let mut state = self.lock();
        let index = state.timers.iter().position(|t| t.id == id)?;
        if state.timers[index].interval.is_some() {
            state.timers[index].callback.take()
        } else {
            state.timers.remove(index).callback
        }
    }

    pub fn len(&self) -> usize {
        self.lock().timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().timers.is_empty()
    }
}

fn run_guarded<F: FnOnce()>(id: u64, callback: F) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        log::error!("Timer callback error ({}): {}", TimerHandle::new(id), panic_message(&*payload));
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayFacility for TimerManager {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.insert(delay, None, TimerSlot::Once(callback))
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut state = self.lock();
        let before = state.timers.len();
        state.timers.retain(|t| t.id != handle.id());
        state.timers.len() < before
    }

    fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        let state = self.lock();
        state
            .timers
            .iter()
            .find(|t| t.id == handle.id())
            .map(|t| t.due.saturating_sub(state.now))
    }

    fn active_timers(&self) -> Vec<TimerInfo> {
        let state = self.lock();
        state
            .timers
            .iter()
            .map(|t| TimerInfo {
                handle: TimerHandle::new(t.id),
                remaining_ms: duration_ms(t.due.saturating_sub(state.now)),
                repeating: t.interval.is_some(),
            })
            .collect()
    }
}
