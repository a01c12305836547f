use crate::capture::host::ViewHost;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::frame::Snapshot;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Readiness policy for [`CaptureSource::prepare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOpts {
    /// Hard ceiling on waiting for a view to report load-complete.
    pub ready_timeout: Duration,
    /// Extra wait after load-complete so in-view async rendering can finish.
    pub settle_delay: Duration,
    /// Size snapshots are resampled to.
    pub canvas: Canvas,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(6),
            settle_delay: Duration::from_millis(800),
            canvas: Canvas::FULL_HD,
        }
    }
}

/// How a `prepare` call resolved. None of these stop the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The host reported load-complete and the settle delay elapsed.
    Ready,
    /// The hard ceiling elapsed first; capture proceeds with whatever the host shows.
    TimedOut,
    /// The host abandoned the load; capture proceeds with whatever the host shows.
    Abandoned,
}

/// Drives the shared view host: one `prepare` and one `snapshot` per scene.
pub struct CaptureSource<H> {
    host: H,
    opts: CaptureOpts,
}

impl<H: ViewHost> CaptureSource<H> {
    /// Wrap a host with a readiness policy.
    pub fn new(host: H, opts: CaptureOpts) -> Self {
        Self { host, opts }
    }

    /// Readiness policy in use.
    pub fn opts(&self) -> &CaptureOpts {
        &self.opts
    }

    /// Borrow the underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Show `view_id` and wait until it is ready, the ceiling elapses, or the run is cancelled.
    ///
    /// Only cancellation is an error; a slow or broken view resolves to
    /// [`Readiness::TimedOut`] or [`Readiness::Abandoned`].
    pub async fn prepare(
        &mut self,
        view_id: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult<Readiness> {
        let ready = self.host.load(view_id);
        let deadline = tokio::time::sleep(self.opts.ready_timeout);

        let readiness = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PipelineError::cancelled(format!("cancelled while preparing view '{view_id}'")));
            }
            signal = ready => match signal {
                Ok(()) => Readiness::Ready,
                Err(_) => Readiness::Abandoned,
            },
            _ = deadline => Readiness::TimedOut,
        };

        match readiness {
            Readiness::Ready => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(PipelineError::cancelled(format!("cancelled while view '{view_id}' was settling")));
                    }
                    _ = tokio::time::sleep(self.opts.settle_delay) => {}
                }
                tracing::debug!(view = view_id, "view ready");
            }
            Readiness::TimedOut => {
                tracing::warn!(
                    view = view_id,
                    timeout_ms = self.opts.ready_timeout.as_millis() as u64,
                    "view did not report ready in time, capturing anyway"
                );
            }
            Readiness::Abandoned => {
                tracing::warn!(view = view_id, "view host abandoned the load, capturing anyway");
            }
        }
        Ok(readiness)
    }

    /// Capture the prepared view once, resampled to the output canvas.
    ///
    /// A failed capture yields `None`; the compositor then draws on a plain background.
    pub async fn snapshot(&mut self) -> Option<Snapshot> {
        let img = match self.host.capture().await {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(error = %e, "view capture failed, using plain background");
                return None;
            }
        };
        match Snapshot::from_rgba_image(&img, self.opts.canvas) {
            Ok(snap) => Some(snap),
            Err(e) => {
                tracing::warn!(error = %e, "captured view is unusable, using plain background");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/source.rs"]
mod tests;
