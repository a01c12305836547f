use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scenecast::{
    AudioDriver, Canvas, CaptureSource, CommandHost, FfmpegSink, FfmpegSinkOpts, Fps,
    FrameCompositor, NarrationTrack, Pipeline, PipelineHandle, PipelineOpts, PipelineOutcome,
    SceneScript, StillImageHost, Timeline, ViewHost,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "scenecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture every scene and render the narrated MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the scaled scene durations for a narration length.
    Timeline(TimelineArgs),
    /// Compose a single frame of one scene as a PNG.
    Frame(FrameArgs),
}

#[derive(clap::Args, Debug, Default)]
struct OptsArgs {
    /// Pipeline options JSON; flags below override it.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Output frame rate (integer fps).
    #[arg(long)]
    fps: Option<u32>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Hard ceiling on waiting for a view to become ready.
    #[arg(long)]
    ready_timeout_ms: Option<u64>,

    /// Extra wait after a view reports ready.
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Overlay font (TTF/OTF). Defaults to the system sans-serif family.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Narration audio file (any format ffmpeg decodes).
    #[arg(long)]
    narration: PathBuf,

    /// Directory of still images, one per view id.
    #[arg(long, conflicts_with = "view_command", required_unless_present = "view_command")]
    views: Option<PathBuf>,

    /// Screenshot command template with `{view}`, `{out}`, `{width}`, `{height}` placeholders.
    #[arg(long)]
    view_command: Option<String>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Fail instead of overwriting an existing output.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    #[command(flatten)]
    opts: OptsArgs,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Scene script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Narration length in seconds.
    #[arg(long)]
    narration_secs: f64,

    /// Frame rate used for the frame columns.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Directory of still images, one per view id.
    #[arg(long)]
    views: PathBuf,

    /// Scene index (0-based).
    #[arg(long)]
    scene: usize,

    /// Seconds into the scene.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Scene length to lay out against; defaults to the scene's nominal seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    opts: OptsArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenecast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => runtime()?.block_on(cmd_frame(args)),
        Command::Render(args) => runtime()?.block_on(cmd_render(args)),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")
}

fn load_opts(args: &OptsArgs) -> anyhow::Result<PipelineOpts> {
    let mut opts = match args.opts.as_deref() {
        Some(path) => PipelineOpts::from_path(path)?,
        None => PipelineOpts::default(),
    };
    if let Some(fps) = args.fps {
        opts.fps = Fps::new(fps, 1)?;
    }
    if args.width.is_some() || args.height.is_some() {
        opts.canvas = Canvas::new(
            args.width.unwrap_or(opts.canvas.width),
            args.height.unwrap_or(opts.canvas.height),
        )?;
    }
    if let Some(ms) = args.ready_timeout_ms {
        opts.ready_timeout_ms = ms;
    }
    if let Some(ms) = args.settle_ms {
        opts.settle_delay_ms = ms;
    }
    if let Some(font) = args.font.clone() {
        opts.style.font_path = Some(font);
    }
    opts.validate()?;
    Ok(opts)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let script = SceneScript::from_path(&args.script)?;
    let fps = Fps::new(args.fps, 1)?;
    let timeline = Timeline::new(&script.nominal_seconds(), args.narration_secs)?;

    if args.json {
        let rows: Vec<serde_json::Value> = script
            .scenes()
            .iter()
            .enumerate()
            .filter_map(|(i, scene)| {
                let span = timeline.span(i)?;
                Some(serde_json::json!({
                    "order": scene.order,
                    "viewId": scene.view_id,
                    "title": scene.title,
                    "nominalSeconds": scene.nominal_seconds,
                    "scaledSeconds": span.len(),
                    "start": span.start,
                    "end": span.end,
                }))
            })
            .collect();
        let doc = serde_json::json!({
            "narrationSeconds": timeline.narration_secs(),
            "scaleFactor": timeline.scale_factor(),
            "totalFrames": timeline.total_frames(fps),
            "scenes": rows,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "narration {:.3}s  scale x{:.4}  {} frames @ {}fps",
        timeline.narration_secs(),
        timeline.scale_factor(),
        timeline.total_frames(fps),
        args.fps
    );
    println!(
        "{:>3}  {:>9}  {:>9}  {:>9}  {:>9}  title",
        "#", "nominal", "scaled", "start", "end"
    );
    for (i, scene) in script.scenes().iter().enumerate() {
        let Some(span) = timeline.span(i) else {
            continue;
        };
        println!(
            "{:>3}  {:>9.3}  {:>9.3}  {:>9.3}  {:>9.3}  {}",
            i + 1,
            scene.nominal_seconds,
            span.len(),
            span.start,
            span.end,
            scene.title
        );
    }
    Ok(())
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let script = SceneScript::from_path(&args.script)?;
    let opts = load_opts(&args.opts)?;
    let scene = script.scenes().get(args.scene).with_context(|| {
        format!(
            "scene {} out of range (script has {})",
            args.scene,
            script.len()
        )
    })?;

    let mut source = CaptureSource::new(StillImageHost::new(&args.views), opts.capture_opts());
    source
        .prepare(&scene.view_id, &CancellationToken::new())
        .await?;
    let snapshot = source.snapshot().await;

    let mut compositor = FrameCompositor::new(opts.canvas, opts.style.clone(), opts.fade_secs())?;
    let duration = args.duration.unwrap_or(scene.nominal_seconds);
    let frame = compositor.compose(
        snapshot.as_ref(),
        scene,
        args.at,
        duration,
        args.scene,
        script.len(),
    )?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let script = SceneScript::from_path(&args.script)?;
    let opts = load_opts(&args.opts)?;
    let narration = NarrationTrack::new(&args.narration);

    let outcome = match (args.view_command.as_deref(), args.views.as_deref()) {
        (Some(template), _) => {
            let work_dir =
                std::env::temp_dir().join(format!("scenecast_views_{}", std::process::id()));
            let host = CommandHost::new(template, &work_dir, opts.canvas)?;
            let outcome = render_with(host, script, opts, narration, &args).await;
            let _ = std::fs::remove_dir_all(&work_dir);
            outcome
        }
        (None, Some(views)) => {
            let host = StillImageHost::new(views);
            render_with(host, script, opts, narration, &args).await
        }
        (None, None) => anyhow::bail!("either --views or --view-command is required"),
    };

    match outcome {
        PipelineOutcome::Completed(artifact) => {
            eprintln!(
                "wrote {} ({} bytes, {} frames, {:.2}s)",
                args.out.display(),
                artifact.bytes,
                artifact.frames,
                artifact.duration.as_secs_f64()
            );
            Ok(())
        }
        PipelineOutcome::Failed { kind, message } => {
            anyhow::bail!("render failed ({kind:?}): {message}")
        }
    }
}

async fn render_with<H: ViewHost, A: AudioDriver>(
    host: H,
    script: SceneScript,
    opts: PipelineOpts,
    narration: A,
    args: &RenderArgs,
) -> PipelineOutcome {
    let cancel = CancellationToken::new();
    let mut pipeline =
        Pipeline::new(script, opts, host, narration).with_cancellation(cancel.clone());
    let handle = pipeline.handle();

    let mut sink_opts = FfmpegSinkOpts::new(&args.out);
    sink_opts.overwrite = !args.no_overwrite;
    let mut sink = FfmpegSink::new(sink_opts);

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted, stopping");
            cancel.cancel();
        }
    });

    let (outcome, ()) = tokio::join!(pipeline.run(&mut sink), report_progress(handle));
    interrupt.abort();
    outcome
}

async fn report_progress(mut handle: PipelineHandle) {
    let mut last_status = String::new();
    let mut last_percent = -1i64;
    while let Some(state) = handle.changed().await {
        let percent = state.percent.floor() as i64;
        if state.status != last_status || percent >= last_percent + 5 {
            eprintln!("[{:5.1}%] {}", state.percent, state.status);
            last_status = state.status.clone();
            last_percent = percent;
        }
        if state.phase.is_terminal() {
            break;
        }
    }
}
