use crate::foundation::error::{PipelineError, PipelineResult};
use anyhow::Context as _;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// The single off-screen surface scenes are shown in.
///
/// Implementations own whatever renders the view (a browser, a file loader). Only one view is
/// shown at a time; calling [`ViewHost::load`] replaces the previous one.
pub trait ViewHost: Send {
    /// Start showing `view_id`.
    ///
    /// The receiver resolves once the host reports load-complete. If the host gives up it drops
    /// the sender, which the capture source treats as "not ready" without waiting further.
    fn load(&mut self, view_id: &str) -> oneshot::Receiver<()>;

    /// Capture the currently shown view as straight-alpha RGBA.
    fn capture(&mut self) -> impl Future<Output = PipelineResult<image::RgbaImage>> + Send;
}

/// Normalize and validate a view id as a path relative to a host root.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths and parent
/// traversals (`..`).
pub fn normalize_view_path(view_id: &str) -> PipelineResult<String> {
    let s = view_id.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PipelineError::configuration("view paths must be relative"));
    }
    if s.trim().is_empty() {
        return Err(PipelineError::configuration("view path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PipelineError::configuration(
                "view paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PipelineError::configuration(
            "view path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Host whose views are pre-rendered image files under a root directory.
///
/// `load` decodes the file on the blocking pool and reports ready once the pixels are in memory.
/// A decode that finishes after a newer `load` is discarded without signalling.
pub struct StillImageHost {
    root: PathBuf,
    current: Arc<Mutex<ViewSlot>>,
}

/// Shown image tagged with the `load` call that produced it.
#[derive(Default)]
struct ViewSlot {
    generation: u64,
    image: Option<image::RgbaImage>,
}

impl ViewSlot {
    fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.image = None;
        self.generation
    }

    /// Store `image` if `generation` is still the latest load.
    fn complete(&mut self, generation: u64, image: image::RgbaImage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.image = Some(image);
        true
    }
}

impl StillImageHost {
    /// Serve views from files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: Arc::new(Mutex::new(ViewSlot::default())),
        }
    }

    /// Root directory views are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ViewHost for StillImageHost {
    fn load(&mut self, view_id: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let generation = match self.current.lock() {
            Ok(mut slot) => slot.begin(),
            Err(_) => {
                tracing::warn!(view = view_id, "view image slot poisoned");
                return rx;
            }
        };

        let path = match normalize_view_path(view_id) {
            Ok(rel) => self.root.join(Path::new(&rel)),
            Err(e) => {
                tracing::warn!(view = view_id, error = %e, "rejecting view id");
                return rx;
            }
        };
        let slot = Arc::clone(&self.current);
        tokio::task::spawn_blocking(move || {
            match image::open(&path) {
                Ok(img) => {
                    let stored = slot
                        .lock()
                        .map(|mut current| current.complete(generation, img.to_rgba8()))
                        .unwrap_or(false);
                    if stored {
                        let _ = tx.send(());
                    } else {
                        tracing::debug!(path = %path.display(), "discarding superseded view decode");
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to decode view image");
                }
            }
        });
        rx
    }

    async fn capture(&mut self) -> PipelineResult<image::RgbaImage> {
        let current = self
            .current
            .lock()
            .map_err(|_| anyhow::anyhow!("view image slot poisoned"))?;
        let img = current
            .image
            .as_ref()
            .context("no view is loaded in the still-image host")?;
        Ok(img.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/host.rs"]
mod tests;
