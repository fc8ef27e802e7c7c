//! Host frame loop.
//!
//! Stands in for the game engine's per-frame update: advance the virtual
//! clock by one frame, then give the scheduler one tick.
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::config::BootstrapConfig;
use crate::kernel::constants;
use crate::kernel::{BootstrapOutcome, BootstrapScheduler, TickReport};
use crate::timer::TimerManager;

/// Result of driving a run with [`FrameLoop::drive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLoopReport {
    pub frames: u64,
    /// `None` when the frame limit was hit before the run ended
    pub outcome: Option<BootstrapOutcome>,
}

#[derive(Debug, Clone)]
pub struct FrameLoop {
    frame: Duration,
    realtime: bool,
    max_frames: u64,
}

impl FrameLoop {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            realtime: false,
            max_frames: constants::DEFAULT_MAX_FRAMES,
        }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(config.frame_interval())
    }

    /// Pace frames with a wall-clock interval instead of running them back to back
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = max_frames.max(1);
        self
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Advance the virtual clock by one frame and tick the scheduler once
    pub fn step(&self, scheduler: &mut BootstrapScheduler, timers: Option<&TimerManager>) -> TickReport {
        if let Some(timers) = timers {
            timers.update(self.frame);
        }
        scheduler.tick()
    }

    /// Step until the active run finishes or the frame limit is reached
    pub async fn drive(&self, scheduler: &mut BootstrapScheduler, timers: Option<&TimerManager>) -> FrameLoopReport {
        if !scheduler.is_bootstrap_in_progress() {
            log::warn!("Frame loop started with no bootstrap run in progress");
            return FrameLoopReport { frames: 0, outcome: None };
        }

        let mut interval = self.realtime.then(|| {
            let mut interval = time::interval(self.frame.max(Duration::from_millis(1)));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        let mut frames = 0;
        loop {
            match interval.as_mut() {
                Some(interval) => {
                    interval.tick().await;
                }
                None => tokio::task::yield_now().await,
            }

            frames += 1;
            let report = self.step(scheduler, timers);
            if let Some(outcome) = report.finished {
                log::debug!("Run {} finished after {} frames", report.run, frames);
                return FrameLoopReport {
                    frames,
                    outcome: Some(outcome),
                };
            }
            if frames >= self.max_frames {
                log::warn!(
                    "Frame limit of {} reached with run {} still in progress ({})",
                    self.max_frames,
                    report.run,
                    scheduler.progress()
                );
                return FrameLoopReport { frames, outcome: None };
            }
        }
    }
}
