use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{PipelineError, PipelineResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Owner of the narration track.
///
/// The playback position is the wall clock every other component is paced against.
pub trait AudioDriver: Send {
    /// Fully buffer and validate the asset, returning its duration.
    fn load(&mut self) -> impl Future<Output = PipelineResult<Duration>> + Send;

    /// Raw PCM handed to the encoder for muxing, if this driver carries audio.
    fn audio_input(&self) -> Option<AudioInputConfig>;

    /// Start playback. Only the first call has an effect.
    fn play(&mut self);

    /// Time since playback started (zero before `play`).
    fn position(&self) -> Duration;

    /// Return `true` once the position reached the duration.
    fn is_ended(&self) -> bool;

    /// Stop playback, freezing the position.
    fn stop(&mut self);
}

/// Monotonic playback clock shared by the drivers in this crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackClock {
    duration: Duration,
    started: Option<Instant>,
    stopped_at: Option<Duration>,
}

impl PlaybackClock {
    /// Clock for a track of `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: None,
            stopped_at: None,
        }
    }

    /// Track duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start the clock once.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Elapsed playback time.
    pub fn position(&self) -> Duration {
        if let Some(at) = self.stopped_at {
            return at;
        }
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Return `true` once playback reached the end of the track.
    pub fn is_ended(&self) -> bool {
        self.started.is_some() && self.position() >= self.duration
    }

    /// Freeze the position.
    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(self.position());
        }
    }
}

/// Driver with a fixed duration and no audio payload.
///
/// Used for silent renders, previews and tests; the output video carries no audio stream.
#[derive(Clone, Debug)]
pub struct SilentNarration {
    clock: PlaybackClock,
}

impl SilentNarration {
    /// Silent track lasting `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            clock: PlaybackClock::new(duration),
        }
    }
}

impl AudioDriver for SilentNarration {
    async fn load(&mut self) -> PipelineResult<Duration> {
        if self.clock.duration().is_zero() {
            return Err(PipelineError::asset("narration has zero length"));
        }
        Ok(self.clock.duration())
    }

    fn audio_input(&self) -> Option<AudioInputConfig> {
        None
    }

    fn play(&mut self) {
        self.clock.start();
    }

    fn position(&self) -> Duration {
        self.clock.position()
    }

    fn is_ended(&self) -> bool {
        self.clock.is_ended()
    }

    fn stop(&mut self) {
        self.clock.stop();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/driver.rs"]
mod tests;
