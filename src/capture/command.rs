use crate::capture::host::ViewHost;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PipelineError, PipelineResult};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Host that renders a view by running an external screenshot command.
///
/// The template is split on whitespace; each word may contain `{view}`, `{out}`, `{width}` and
/// `{height}` placeholders. A typical template drives a headless browser:
///
/// ```text
/// chromium --headless --hide-scrollbars --window-size={width},{height} --screenshot={out} {view}
/// ```
///
/// Readiness fires when the command exits successfully and the screenshot exists.
pub struct CommandHost {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
    canvas: Canvas,
    loads: u64,
    out_path: Option<PathBuf>,
    running: Option<JoinHandle<()>>,
}

impl CommandHost {
    /// Parse `template` and write screenshots into `work_dir`.
    pub fn new(template: &str, work_dir: impl Into<PathBuf>, canvas: Canvas) -> PipelineResult<Self> {
        let mut words = template.split_whitespace().map(str::to_owned);
        let program = words
            .next()
            .ok_or_else(|| PipelineError::configuration("view command template is empty"))?;
        let args: Vec<String> = words.collect();
        if !args.iter().any(|a| a.contains("{out}")) {
            return Err(PipelineError::configuration(
                "view command template must contain an {out} placeholder",
            ));
        }
        let work_dir = work_dir.into();
        std::fs::create_dir_all(&work_dir).map_err(|e| {
            PipelineError::configuration(format!(
                "failed to create view work dir '{}': {e}",
                work_dir.display()
            ))
        })?;
        Ok(Self {
            program,
            args,
            work_dir,
            canvas,
            loads: 0,
            out_path: None,
            running: None,
        })
    }

    fn expand(&self, view_id: &str, out: &std::path::Path) -> Vec<String> {
        let out = out.to_string_lossy();
        self.args
            .iter()
            .map(|a| {
                a.replace("{view}", view_id)
                    .replace("{out}", &out)
                    .replace("{width}", &self.canvas.width.to_string())
                    .replace("{height}", &self.canvas.height.to_string())
            })
            .collect()
    }
}

impl ViewHost for CommandHost {
    fn load(&mut self, view_id: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if let Some(prev) = self.running.take() {
            prev.abort();
        }

        self.loads += 1;
        let out = self.work_dir.join(format!("view-{:04}.png", self.loads));
        let _ = std::fs::remove_file(&out);
        let args = self.expand(view_id, &out);
        let program = self.program.clone();
        let view = view_id.to_owned();
        self.out_path = Some(out.clone());

        self.running = Some(tokio::spawn(async move {
            let result = tokio::process::Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await;
            match result {
                Ok(output) if output.status.success() && out.exists() => {
                    let _ = tx.send(());
                }
                Ok(output) => {
                    tracing::warn!(
                        view = %view,
                        status = %output.status,
                        stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                        "view command did not produce a screenshot"
                    );
                }
                Err(e) => {
                    tracing::warn!(view = %view, error = %e, "failed to run view command");
                }
            }
        }));
        rx
    }

    async fn capture(&mut self) -> PipelineResult<image::RgbaImage> {
        let path = self
            .out_path
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no view has been loaded in the command host"))?;
        let img = tokio::task::spawn_blocking(move || image::open(&path).map(|i| i.to_rgba8()))
            .await
            .map_err(|e| anyhow::anyhow!("screenshot decode task failed: {e}"))?
            .map_err(|e| anyhow::anyhow!("failed to decode screenshot: {e}"))?;
        Ok(img)
    }
}

impl Drop for CommandHost {
    fn drop(&mut self) {
        if let Some(task) = self.running.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/command.rs"]
mod tests;
