use crate::encode::sink::Artifact;
use crate::foundation::error::{ErrorKind, PipelineError};
use tokio::sync::watch;

/// Orchestrator state machine position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PipelinePhase {
    /// Not started.
    Idle,
    /// Loading narration, building the timeline, starting the encoder.
    Initializing,
    /// Capturing or recording the scene at this index.
    PlayingScene(usize),
    /// Audio stopped, encoder flushing.
    Finalizing,
    /// Artifact produced.
    Completed,
    /// Run ended with an error.
    Failed,
}

impl PipelinePhase {
    /// Return `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum PipelineOutcome {
    /// The muxed output is ready.
    Completed(Artifact),
    /// A fatal error stopped the run; no artifact is returned.
    Failed {
        /// Error category.
        kind: ErrorKind,
        /// Human-readable reason.
        message: String,
    },
}

impl PipelineOutcome {
    /// Build a `Failed` outcome from an error.
    pub fn failed(err: &PipelineError) -> Self {
        Self::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The artifact, if the run completed.
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Completed(artifact) => Some(artifact),
            Self::Failed { .. } => None,
        }
    }
}

/// Snapshot of run progress, readable at any time through a [`PipelineHandle`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PipelineState {
    /// State machine position.
    pub phase: PipelinePhase,
    /// Index of the scene being captured or recorded.
    pub current_scene: Option<usize>,
    /// Number of scenes in the script.
    pub scene_count: usize,
    /// Seconds recorded so far in the current scene.
    pub scene_elapsed: f64,
    /// Overall progress in `[0, 100]`; non-decreasing, exactly 100 only once completed.
    pub percent: f64,
    /// Frames handed to the sink.
    pub frames_pushed: u64,
    /// Short human-readable description of the current step.
    pub status: String,
    /// Set once the phase is terminal.
    pub outcome: Option<PipelineOutcome>,
}

impl PipelineState {
    pub(crate) fn idle(scene_count: usize) -> Self {
        Self {
            phase: PipelinePhase::Idle,
            current_scene: None,
            scene_count,
            scene_elapsed: 0.0,
            percent: 0.0,
            frames_pushed: 0,
            status: "idle".to_owned(),
            outcome: None,
        }
    }
}

/// Largest percentage reported while a run is still in flight.
pub(crate) const RUNNING_PERCENT_CEILING: f64 = 99.9;

/// Orchestrator-side writer; the only place `PipelineState` is mutated.
#[derive(Debug)]
pub(crate) struct StateWriter {
    tx: watch::Sender<PipelineState>,
}

impl StateWriter {
    pub(crate) fn new(scene_count: usize) -> Self {
        let (tx, _rx) = watch::channel(PipelineState::idle(scene_count));
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> PipelineHandle {
        PipelineHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn current(&self) -> PipelineState {
        self.tx.borrow().clone()
    }

    pub(crate) fn phase(&self, phase: PipelinePhase, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|s| {
            s.phase = phase;
            s.status = status;
            if let PipelinePhase::PlayingScene(i) = phase {
                if s.current_scene != Some(i) {
                    s.scene_elapsed = 0.0;
                }
                s.current_scene = Some(i);
            }
        });
    }

    pub(crate) fn status(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|s| s.status = status);
    }

    pub(crate) fn frame(&self, scene_elapsed: f64, percent: f64) {
        self.tx.send_modify(|s| {
            s.scene_elapsed = scene_elapsed.max(0.0);
            let percent = if percent.is_finite() { percent } else { 0.0 };
            s.percent = s
                .percent
                .max(percent.clamp(0.0, RUNNING_PERCENT_CEILING));
            s.frames_pushed += 1;
        });
    }

    pub(crate) fn finish(&self, outcome: PipelineOutcome) {
        self.tx.send_modify(|s| {
            match &outcome {
                PipelineOutcome::Completed(_) => {
                    s.phase = PipelinePhase::Completed;
                    s.percent = 100.0;
                    s.status = "done".to_owned();
                }
                PipelineOutcome::Failed { message, .. } => {
                    s.phase = PipelinePhase::Failed;
                    s.status = format!("failed: {message}");
                }
            }
            s.outcome = Some(outcome);
        });
    }
}

/// Caller-side view of a run.
///
/// Reading never blocks the pipeline; readers see the latest published snapshot.
#[derive(Clone, Debug)]
pub struct PipelineHandle {
    rx: watch::Receiver<PipelineState>,
}

impl PipelineHandle {
    /// Latest published state.
    pub fn state(&self) -> PipelineState {
        self.rx.borrow().clone()
    }

    /// Wait for the next state update and return it.
    ///
    /// Returns `None` once the pipeline is gone and no further updates can arrive.
    pub async fn changed(&mut self) -> Option<PipelineState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the run ends.
    pub async fn wait(mut self) -> PipelineOutcome {
        let outcome = match self.rx.wait_for(|s| s.outcome.is_some()).await {
            Ok(state) => state.outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(dropped_outcome)
    }
}

fn dropped_outcome() -> PipelineOutcome {
    PipelineOutcome::Failed {
        kind: ErrorKind::Other,
        message: "pipeline was dropped before it finished".to_owned(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
