use crate::audio::driver::AudioDriver;
use crate::capture::host::ViewHost;
use crate::capture::source::CaptureSource;
use crate::encode::sink::{Artifact, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::pipeline::opts::PipelineOpts;
use crate::pipeline::state::{
    PipelineHandle, PipelineOutcome, PipelinePhase, PipelineState, StateWriter,
};
use crate::render::compositor::FrameCompositor;
use crate::script::model::SceneScript;
use crate::timeline::clock::FrameClock;
use crate::timeline::scaler::Timeline;
use tokio_util::sync::CancellationToken;

/// Single-run pipeline: narration, per-scene capture, per-frame composition, encoding.
///
/// The pipeline exclusively owns its view host and audio driver for the whole run. Scenes are
/// processed strictly in script order on the caller's task; callers observe progress through
/// [`Pipeline::handle`].
///
/// Sink calls are synchronous. On a multi-threaded tokio runtime they run through
/// [`tokio::task::block_in_place`] so pipe writes and the encoder's final wait do not stall other
/// tasks; on a current-thread runtime they run inline and hold the thread while they block.
pub struct Pipeline<H, A> {
    script: SceneScript,
    opts: PipelineOpts,
    capture: CaptureSource<H>,
    audio: A,
    cancel: CancellationToken,
    state: StateWriter,
    started: bool,
}

impl<H: ViewHost, A: AudioDriver> Pipeline<H, A> {
    /// Assemble a pipeline. Nothing is loaded until [`Pipeline::run`].
    pub fn new(script: SceneScript, opts: PipelineOpts, host: H, audio: A) -> Self {
        let capture = CaptureSource::new(host, opts.capture_opts());
        let state = StateWriter::new(script.len());
        Self {
            script,
            opts,
            capture,
            audio,
            cancel: CancellationToken::new(),
            state,
            started: false,
        }
    }

    /// Use `cancel` to stop the run early.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Progress surface for callers; may be taken before or during the run.
    pub fn handle(&self) -> PipelineHandle {
        self.state.subscribe()
    }

    /// Latest published state.
    pub fn state(&self) -> PipelineState {
        self.state.current()
    }

    /// Options in use.
    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Scene script in use.
    pub fn script(&self) -> &SceneScript {
        &self.script
    }

    /// Borrow the audio driver.
    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Borrow the capture source.
    pub fn capture(&self) -> &CaptureSource<H> {
        &self.capture
    }

    /// Run to completion, streaming frames into `sink`.
    ///
    /// Fatal errors abort the sink (discarding partial output), stop the audio and surface as
    /// [`PipelineOutcome::Failed`]. A pipeline runs once; later calls fail immediately.
    #[tracing::instrument(skip_all, fields(scenes = self.script.len()))]
    pub async fn run(&mut self, sink: &mut dyn FrameSink) -> PipelineOutcome {
        if self.started {
            let err = PipelineError::configuration("pipeline has already run");
            return PipelineOutcome::failed(&err);
        }
        self.started = true;

        let outcome = match self.run_inner(sink).await {
            Ok(artifact) => {
                tracing::info!(
                    frames = artifact.frames,
                    bytes = artifact.bytes,
                    secs = artifact.duration.as_secs_f64(),
                    "pipeline completed"
                );
                PipelineOutcome::Completed(artifact)
            }
            Err(err) => {
                run_blocking(|| sink.abort());
                self.audio.stop();
                match &err {
                    PipelineError::Cancelled(_) => tracing::info!(error = %err, "pipeline cancelled"),
                    _ => tracing::error!(error = %err, "pipeline failed"),
                }
                PipelineOutcome::failed(&err)
            }
        };
        self.state.finish(outcome.clone());
        outcome
    }

    async fn run_inner(&mut self, sink: &mut dyn FrameSink) -> PipelineResult<Artifact> {
        let fps = self.opts.fps;

        self.state
            .phase(PipelinePhase::Initializing, "loading narration");
        self.opts.validate()?;
        let mut compositor = FrameCompositor::new(
            self.opts.canvas,
            self.opts.style.clone(),
            self.opts.fade_secs(),
        )?;

        let narration = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(PipelineError::cancelled("cancelled while loading narration"));
            }
            loaded = self.audio.load() => loaded?,
        };

        let timeline = Timeline::new(&self.script.nominal_seconds(), narration.as_secs_f64())?;
        tracing::debug!(
            narration_secs = timeline.narration_secs(),
            scale = timeline.scale_factor(),
            scaled = ?timeline.scaled_seconds(),
            "timeline computed"
        );

        let total_frames = timeline.total_frames(fps);
        self.state.status("starting encoder");
        let sink_cfg = SinkConfig {
            width: self.opts.canvas.width,
            height: self.opts.canvas.height,
            fps,
            audio: self.audio.audio_input(),
            total_frames,
        };
        run_blocking(|| sink.start(sink_cfg))?;

        self.audio.play();
        tracing::info!(
            secs = timeline.narration_secs(),
            frames = total_frames,
            "narration playing"
        );

        let narration_secs = timeline.narration_secs();
        let scene_count = self.script.len();
        let mut clock = FrameClock::new(fps);
        let mut last_pushed: Option<FrameIndex> = None;

        for (i, scene) in self.script.scenes().iter().enumerate() {
            let Some(span) = timeline.span(i) else {
                break;
            };
            if self.cancel.is_cancelled() {
                return Err(PipelineError::cancelled(format!(
                    "cancelled before scene {}",
                    i + 1
                )));
            }

            self.state.phase(
                PipelinePhase::PlayingScene(i),
                format!("capturing scene {}/{scene_count}: {}", i + 1, scene.title),
            );
            tracing::info!(scene = i, view = %scene.view_id, title = %scene.title, "scene start");

            self.capture.prepare(&scene.view_id, &self.cancel).await?;
            let snapshot = self.capture.snapshot().await;

            // Frames are anchored to narration time. Capture may eat into the scene's span, in
            // which case the scene is shown for what remains of it.
            let local_start = span.start.max(self.audio.position().as_secs_f64());
            let duration = span.end - local_start;
            if duration <= 0.0 {
                tracing::warn!(
                    scene = i,
                    view = %scene.view_id,
                    "capture outlasted the scene's narration span, skipping scene"
                );
                continue;
            }

            self.state
                .status(format!("recording scene {}/{scene_count}: {}", i + 1, scene.title));

            loop {
                let pos = self.audio.position().as_secs_f64();
                let idx = fps.frame_at(pos);
                if pos >= span.end || fps.frames_to_secs(idx.0) >= span.end || idx.0 >= total_frames
                {
                    break;
                }
                if last_pushed.is_none_or(|last| idx > last) {
                    let elapsed = pos - local_start;
                    let frame = compositor.compose(
                        snapshot.as_ref(),
                        scene,
                        elapsed,
                        duration,
                        i,
                        scene_count,
                    )?;
                    run_blocking(|| sink.push_frame(idx, &frame))?;
                    last_pushed = Some(idx);
                    self.state.frame(elapsed, pos / narration_secs * 100.0);
                }

                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        return Err(PipelineError::cancelled(format!(
                            "cancelled while recording scene {}",
                            i + 1
                        )));
                    }
                    _ = clock.tick() => {}
                }
            }
        }

        self.state.phase(PipelinePhase::Finalizing, "encoding");
        self.audio.stop();
        let artifact = run_blocking(|| sink.finalize())?;
        Ok(artifact)
    }
}

/// Run a blocking call, moving it off the async scheduler when the runtime allows it.
pub(crate) fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
