use crate::audio::decode::{NARRATION_SAMPLE_RATE, decode_audio_f32_stereo, write_f32le_file};
use crate::audio::driver::{AudioDriver, PlaybackClock};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Narration read from an audio file on disk.
///
/// `load` decodes the whole file up front, both to learn the exact duration and to stage raw PCM
/// for the encoder. The staged file is removed when the track is dropped.
#[derive(Debug)]
pub struct NarrationTrack {
    path: PathBuf,
    sample_rate: u32,
    staged: Option<PathBuf>,
    clock: PlaybackClock,
}

impl NarrationTrack {
    /// Track backed by the audio file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sample_rate: NARRATION_SAMPLE_RATE,
            staged: None,
            clock: PlaybackClock::new(Duration::ZERO),
        }
    }

    /// Source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Duration learned by `load` (zero before).
    pub fn duration(&self) -> Duration {
        self.clock.duration()
    }

    fn staging_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir().join(format!(
            "scenecast_narration_{}_{nanos}.f32le",
            std::process::id()
        ))
    }

    fn remove_staged(&mut self) {
        if let Some(path) = self.staged.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl AudioDriver for NarrationTrack {
    async fn load(&mut self) -> PipelineResult<Duration> {
        if !self.path.is_file() {
            return Err(PipelineError::asset(format!(
                "narration file '{}' does not exist",
                self.path.display()
            )));
        }

        let pcm = decode_audio_f32_stereo(&self.path, self.sample_rate).await?;
        let duration = pcm.duration();
        if duration.is_zero() {
            return Err(PipelineError::asset(format!(
                "narration '{}' decoded to zero samples",
                self.path.display()
            )));
        }

        self.remove_staged();
        let staged = Self::staging_path();
        write_f32le_file(&pcm.interleaved_f32, &staged).await?;
        self.staged = Some(staged);
        self.clock = PlaybackClock::new(duration);

        tracing::debug!(
            path = %self.path.display(),
            secs = duration.as_secs_f64(),
            "narration loaded"
        );
        Ok(duration)
    }

    fn audio_input(&self) -> Option<AudioInputConfig> {
        self.staged.as_ref().map(|path| AudioInputConfig {
            path: path.clone(),
            sample_rate: self.sample_rate,
            channels: 2,
        })
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

impl Drop for NarrationTrack {
    fn drop(&mut self) {
        self.remove_staged();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/narration.rs"]
mod tests;
