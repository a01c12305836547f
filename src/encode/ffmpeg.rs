use crate::encode::sink::{Artifact, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::Frame;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// x264 preset.
    pub preset: String,
    /// x264 constant rate factor.
    pub crf: u8,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            preset: "veryfast".to_owned(),
            crf: 20,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// The sink owns output timing: every frame slot between the first and the last pushed index is
/// written exactly once. Skipped slots repeat the previous frame, slots that were already written
/// are dropped, and `finalize` pads up to `SinkConfig::total_frames` so the video covers the whole
/// narration.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    last: Vec<u8>,
    cfg: Option<SinkConfig>,
    next_idx: u64,
    finalized: bool,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            last: Vec::new(),
            cfg: None,
            next_idx: 0,
            finalized: false,
        }
    }

    /// Output options.
    pub fn opts(&self) -> &FfmpegSinkOpts {
        &self.opts
    }

    /// Frames written to ffmpeg so far.
    pub fn frames_written(&self) -> u64 {
        self.next_idx
    }

    fn write_last(&mut self, times: u64) -> PipelineResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PipelineError::sink_closed("ffmpeg sink is already finalized"));
        };
        for _ in 0..times {
            stdin.write_all(&self.last).map_err(|e| {
                PipelineError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        self.next_idx += times;
        Ok(())
    }

    fn build_command(&self, cfg: &SinkConfig) -> PipelineResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw RGBA8 frames, already flattened to opaque in `push_frame`.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let video_args = [
            "-c:v".to_owned(),
            "libx264".to_owned(),
            "-preset".to_owned(),
            self.opts.preset.clone(),
            "-crf".to_owned(),
            self.opts.crf.to_string(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
        ];

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(PipelineError::encoder_unavailable(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-map", "0:v:0", "-map", "1:a:0"])
            .args(&video_args)
            .args(["-c:a", "aac", "-shortest", "-movflags", "+faststart"]);
        } else {
            cmd.arg("-an")
                .args(&video_args)
                .args(["-movflags", "+faststart"]);
        }
        cmd.arg(&self.opts.out_path);
        Ok(cmd)
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn start(&mut self, cfg: SinkConfig) -> PipelineResult<()> {
        if self.child.is_some() {
            return Err(PipelineError::encoder_unavailable(
                "ffmpeg sink already started",
            ));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(PipelineError::encoder_unavailable("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(PipelineError::encoder_unavailable(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(PipelineError::encoder_unavailable(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(PipelineError::encoder_unavailable(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(PipelineError::encoder_unavailable(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.build_command(&cfg)?.spawn().map_err(|e| {
            PipelineError::encoder_unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            PipelineError::encoder_unavailable("failed to open ffmpeg stdin (unexpected)")
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            PipelineError::encoder_unavailable("failed to open ffmpeg stderr (unexpected)")
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let [r, g, b, _] = self.opts.bg_rgba;
        self.last = [r, g, b, 255].repeat((cfg.width * cfg.height) as usize);
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            audio = cfg.audio.is_some(),
            "ffmpeg sink started"
        );
        self.cfg = Some(cfg);
        self.next_idx = 0;
        self.finalized = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PipelineResult<()> {
        if self.finalized {
            return Err(PipelineError::sink_closed(format!(
                "frame {} pushed after finalize",
                idx.0
            )));
        }
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| PipelineError::encoder("ffmpeg sink not started"))?;

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(PipelineError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.last.len() {
            return Err(PipelineError::encoder(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if idx.0 < self.next_idx {
            tracing::trace!(idx = idx.0, next = self.next_idx, "dropping duplicate frame slot");
            return Ok(());
        }

        let gap = idx.0 - self.next_idx;
        if gap > 0 {
            tracing::debug!(from = self.next_idx, to = idx.0, "filling skipped frame slots");
            self.write_last(gap)?;
        }

        let bg = self.opts.bg_rgba;
        flatten_to_opaque_rgba8(&mut self.last, &frame.data, frame.premultiplied, bg)?;
        self.write_last(1)
    }

    fn finalize(&mut self) -> PipelineResult<Artifact> {
        if self.finalized {
            return Err(PipelineError::sink_closed("ffmpeg sink already finalized"));
        }
        let (fps, total_frames) = match self.cfg.as_ref() {
            Some(cfg) => (cfg.fps, cfg.total_frames),
            None => return Err(PipelineError::encoder("ffmpeg sink not started")),
        };

        if self.next_idx < total_frames {
            self.write_last(total_frames - self.next_idx)?;
        }

        drop(self.stdin.take());
        self.finalized = true;
        let mut child = self
            .child
            .take()
            .ok_or_else(|| PipelineError::encoder("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            PipelineError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PipelineError::encoder("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| PipelineError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            let _ = std::fs::remove_file(&self.opts.out_path);
            return Err(PipelineError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let bytes = std::fs::metadata(&self.opts.out_path)
            .map_err(|e| {
                PipelineError::encoder(format!(
                    "ffmpeg produced no output at '{}': {e}",
                    self.opts.out_path.display()
                ))
            })?
            .len();

        Ok(Artifact {
            path: Some(self.opts.out_path.clone()),
            bytes,
            frames: self.next_idx,
            duration: Duration::from_secs_f64(fps.frames_to_secs(self.next_idx)),
        })
    }

    fn abort(&mut self) {
        if self.child.is_none() {
            return;
        }
        self.kill_child();
        self.finalized = true;
        let _ = std::fs::remove_file(&self.opts.out_path);
        tracing::debug!(out = %self.opts.out_path.display(), "ffmpeg sink aborted");
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.abort();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> PipelineResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PipelineError::encoder(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255_u16(bg_r, inv),
                u16::from(s[1]) + mul_div255_u16(bg_g, inv),
                u16::from(s[2]) + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
