use crate::foundation::core::Fps;
use crate::foundation::error::{PipelineError, PipelineResult};

/// Rescale nominal durations so they sum to `narration_secs`.
///
/// Every output entry is `nominal[i] * narration_secs / sum(nominal)`. Scripts are authored
/// artifacts, so scenes scaled below one frame period are not rejected here.
pub fn compute_scaled_durations(nominal: &[f64], narration_secs: f64) -> PipelineResult<Vec<f64>> {
    if !narration_secs.is_finite() || narration_secs <= 0.0 {
        return Err(PipelineError::configuration(format!(
            "narration duration must be finite and > 0, got {narration_secs}"
        )));
    }
    if nominal.is_empty() {
        return Err(PipelineError::configuration(
            "timeline needs at least one scene",
        ));
    }
    if let Some((i, d)) = nominal
        .iter()
        .enumerate()
        .find(|(_, d)| !d.is_finite() || **d <= 0.0)
    {
        return Err(PipelineError::configuration(format!(
            "scene {i} nominal duration must be finite and > 0, got {d}"
        )));
    }

    let total: f64 = nominal.iter().sum();
    let scale = narration_secs / total;
    Ok(nominal.iter().map(|d| d * scale).collect())
}

/// Half-open span `[start, end)` of one scene in narration seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSpan {
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
}

impl SceneSpan {
    /// Span length in seconds.
    pub fn len(self) -> f64 {
        self.end - self.start
    }

    /// Return `true` when the span has no length.
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Per-run timeline derived once from the script weights and the narration length.
#[derive(Clone, Debug)]
pub struct Timeline {
    narration_secs: f64,
    scale_factor: f64,
    scaled: Vec<f64>,
    spans: Vec<SceneSpan>,
}

impl Timeline {
    /// Compute the timeline; see [`compute_scaled_durations`].
    pub fn new(nominal: &[f64], narration_secs: f64) -> PipelineResult<Self> {
        let scaled = compute_scaled_durations(nominal, narration_secs)?;
        let total: f64 = nominal.iter().sum();

        let mut spans = Vec::with_capacity(scaled.len());
        let mut cursor = 0.0;
        for (i, d) in scaled.iter().enumerate() {
            // The last boundary is pinned so accumulated rounding never shortens the output.
            let end = if i + 1 == scaled.len() {
                narration_secs
            } else {
                cursor + d
            };
            spans.push(SceneSpan { start: cursor, end });
            cursor = end;
        }

        Ok(Self {
            narration_secs,
            scale_factor: narration_secs / total,
            scaled,
            spans,
        })
    }

    /// Narration length in seconds (ground truth).
    pub fn narration_secs(&self) -> f64 {
        self.narration_secs
    }

    /// `narration / sum(nominal)`.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Scaled per-scene durations in script order.
    pub fn scaled_seconds(&self) -> &[f64] {
        &self.scaled
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Always `false` for a constructed timeline.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Narration-time span of scene `i`.
    pub fn span(&self, i: usize) -> Option<SceneSpan> {
        self.spans.get(i).copied()
    }

    /// Index of the scene playing at narration time `t`, if any.
    pub fn scene_at(&self, t: f64) -> Option<usize> {
        if !(0.0..self.narration_secs).contains(&t) {
            return None;
        }
        let i = self.spans.partition_point(|s| s.end <= t);
        (i < self.spans.len()).then_some(i)
    }

    /// Output length in whole frames.
    pub fn total_frames(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.narration_secs).max(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scaler.rs"]
mod tests;
