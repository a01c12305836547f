//! Scenecast turns a scripted sequence of application views plus a narration track into one
//! synchronized video.
//!
//! Every scene's nominal length is rescaled so the script spans the narration exactly. Each view is
//! captured once, a moving overlay (title, caption, progress bar, counter, fades) is composited on
//! the CPU every frame, and frames are muxed with the narration by `ffmpeg`:
//!
//! - Load a [`SceneScript`] and [`PipelineOpts`]
//! - Pick a [`ViewHost`] and an [`AudioDriver`]
//! - Build a [`Pipeline`] and [`Pipeline::run`] it into a [`FrameSink`]
//! - Watch progress through a [`PipelineHandle`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Narration decoding and playback clocks.
pub mod audio;
/// View hosts and the capture source.
pub mod capture;
/// Encoding sinks.
pub mod encode;
/// Run orchestration and progress reporting.
pub mod pipeline;
/// CPU frame composition.
pub mod render;
/// Scene scripts.
pub mod script;
/// Timeline scaling and frame pacing.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect};
pub use crate::foundation::error::{ErrorKind, PipelineError, PipelineResult};

pub use crate::audio::driver::{AudioDriver, PlaybackClock, SilentNarration};
pub use crate::audio::narration::NarrationTrack;
pub use crate::capture::command::CommandHost;
pub use crate::capture::host::{StillImageHost, ViewHost};
pub use crate::capture::source::{CaptureOpts, CaptureSource, Readiness};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{Artifact, AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::pipeline::opts::PipelineOpts;
pub use crate::pipeline::orchestrator::Pipeline;
pub use crate::pipeline::state::{PipelineHandle, PipelineOutcome, PipelinePhase, PipelineState};
pub use crate::render::compositor::{FrameCompositor, fade_opacity, progress_fraction};
pub use crate::render::frame::{Frame, Snapshot};
pub use crate::render::style::{OverlayLayout, OverlayStyle};
pub use crate::script::model::{SceneScript, SceneSpec};
pub use crate::timeline::clock::FrameClock;
pub use crate::timeline::scaler::{SceneSpan, Timeline, compute_scaled_durations};
