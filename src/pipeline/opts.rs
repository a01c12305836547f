use crate::capture::source::CaptureOpts;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::style::OverlayStyle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Options for one pipeline run.
///
/// Deserializable from JSON; omitted fields keep their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Output resolution.
    pub canvas: Canvas,
    /// Hard ceiling on waiting for a scene's view to report ready.
    pub ready_timeout_ms: u64,
    /// Extra wait after a view reports ready.
    pub settle_delay_ms: u64,
    /// Length of the fade-in and fade-out ramps of every scene.
    pub fade_ms: u64,
    /// Overlay colors, proportions and font.
    pub style: OverlayStyle,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            canvas: Canvas::FULL_HD,
            ready_timeout_ms: 6_000,
            settle_delay_ms: 800,
            fade_ms: 500,
            style: OverlayStyle::default(),
        }
    }
}

impl PipelineOpts {
    /// Parse options from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> PipelineResult<Self> {
        let opts: Self = serde_json::from_reader(r).map_err(|e| {
            PipelineError::configuration(format!("parse pipeline options JSON: {e}"))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PipelineError::configuration(format!(
                "open pipeline options JSON '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate frame rate, canvas and style proportions.
    pub fn validate(&self) -> PipelineResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        self.canvas.validate()?;
        let header = self.style.header_fraction;
        if !(header.is_finite() && (0.0..=0.5).contains(&header)) {
            return Err(PipelineError::configuration(format!(
                "style.header_fraction must be within [0, 0.5], got {header}"
            )));
        }
        Ok(())
    }

    /// Readiness ceiling as a [`Duration`].
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Fade ramp length in seconds.
    pub fn fade_secs(&self) -> f64 {
        Duration::from_millis(self.fade_ms).as_secs_f64()
    }

    /// Readiness policy handed to the capture source.
    pub fn capture_opts(&self) -> CaptureOpts {
        CaptureOpts {
            ready_timeout: self.ready_timeout(),
            settle_delay: self.settle_delay(),
            canvas: self.canvas,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/opts.rs"]
mod tests;
