use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::frame::Frame;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Optional raw PCM narration input muxed into the output.
    pub audio: Option<AudioInputConfig>,
    /// Frame count the finished artifact must cover (the narration length at `fps`).
    pub total_frames: u64,
}

/// Raw PCM audio input configuration for sinks that support audio encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Immutable result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Artifact {
    /// Output file, when the sink writes one.
    pub path: Option<PathBuf>,
    /// Size of the output in bytes.
    pub bytes: u64,
    /// Frames the output contains.
    pub frames: u64,
    /// Playback length of the video stream.
    pub duration: Duration,
}

/// Sink contract for consuming composed frames in timeline order.
///
/// Frame indices are slots on the output timeline. Callers push in increasing order but may skip
/// slots when a tick was missed; sinks that produce timed output fill such gaps themselves.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn start(&mut self, cfg: SinkConfig) -> PipelineResult<()>;

    /// Push one frame for slot `idx`.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PipelineResult<()>;

    /// Flush everything and produce the artifact. Later pushes fail with `SinkClosed`.
    fn finalize(&mut self) -> PipelineResult<Artifact>;

    /// Tear down after a failed or cancelled run, discarding partial output.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    finalized: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `start`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Return `true` after a successful `finalize`.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Return `true` if the sink was torn down by `abort`.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn start(&mut self, cfg: SinkConfig) -> PipelineResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finalized = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PipelineResult<()> {
        if self.finalized {
            return Err(PipelineError::sink_closed(format!(
                "frame {} pushed after finalize",
                idx.0
            )));
        }
        if self.cfg.is_none() {
            return Err(PipelineError::encoder("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn finalize(&mut self) -> PipelineResult<Artifact> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| PipelineError::encoder("in-memory sink not started"))?;
        if self.finalized {
            return Err(PipelineError::sink_closed("sink already finalized"));
        }
        self.finalized = true;

        let frames = self.frames.len() as u64;
        Ok(Artifact {
            path: None,
            bytes: self.frames.iter().map(|(_, f)| f.data.len() as u64).sum(),
            frames,
            duration: Duration::from_secs_f64(cfg.fps.frames_to_secs(frames)),
        })
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
