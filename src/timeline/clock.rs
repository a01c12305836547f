use crate::foundation::core::Fps;
use tokio::time::{Interval, MissedTickBehavior};

/// Periodic timer firing at the output frame rate.
///
/// The clock only paces work; which frame a tick belongs to is decided by the narration position
/// at the time of the tick. Late ticks are skipped rather than bursted, so a slow frame costs one
/// slot instead of a catch-up storm.
pub struct FrameClock {
    interval: Interval,
    fps: Fps,
}

impl FrameClock {
    /// Start a clock whose first tick completes immediately.
    pub fn new(fps: Fps) -> Self {
        let mut interval = tokio::time::interval(fps.frame_period());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, fps }
    }

    /// Frame rate the clock was built for.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Wait for the next frame boundary.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/clock.rs"]
mod tests;
