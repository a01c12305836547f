use super::*;
use std::collections::HashMap;
use tokio::sync::oneshot;
use tokio::time::Instant;

#[derive(Clone, Copy)]
enum Behavior {
    ReadyAfter(Duration),
    Never,
    Abandon,
    CaptureFails,
}

struct ScriptedHost {
    views: HashMap<String, Behavior>,
    current: Option<Behavior>,
    held: Vec<oneshot::Sender<()>>,
    captures: usize,
}

impl ScriptedHost {
    fn new(views: &[(&str, Behavior)]) -> Self {
        Self {
            views: views.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            current: None,
            held: Vec::new(),
            captures: 0,
        }
    }
}

impl ViewHost for ScriptedHost {
    fn load(&mut self, view_id: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let behavior = self.views[view_id];
        self.current = Some(behavior);
        match behavior {
            Behavior::ReadyAfter(d) => {
                tokio::spawn(async move {
                    tokio::time::sleep(d).await;
                    let _ = tx.send(());
                });
            }
            Behavior::Never => self.held.push(tx),
            Behavior::Abandon => drop(tx),
            Behavior::CaptureFails => {
                let _ = tx.send(());
            }
        }
        rx
    }

    async fn capture(&mut self) -> PipelineResult<image::RgbaImage> {
        self.captures += 1;
        match self.current {
            Some(Behavior::CaptureFails) | None => {
                Err(PipelineError::Other(anyhow::anyhow!("surface is tainted")))
            }
            _ => Ok(image::RgbaImage::from_pixel(
                8,
                8,
                image::Rgba([0, 128, 255, 255]),
            )),
        }
    }
}

fn opts() -> CaptureOpts {
    CaptureOpts {
        ready_timeout: Duration::from_secs(6),
        settle_delay: Duration::from_millis(800),
        canvas: Canvas::new(32, 18).unwrap(),
    }
}

#[tokio::test(start_paused = true)]
async fn ready_view_waits_for_load_plus_settle() {
    let host = ScriptedHost::new(&[("a", Behavior::ReadyAfter(Duration::from_millis(300)))]);
    let mut source = CaptureSource::new(host, opts());
    let start = Instant::now();
    let r = source.prepare("a", &CancellationToken::new()).await.unwrap();
    assert_eq!(r, Readiness::Ready);
    assert_eq!(start.elapsed(), Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn silent_view_times_out_at_ceiling() {
    let mut source = CaptureSource::new(ScriptedHost::new(&[("a", Behavior::Never)]), opts());
    let start = Instant::now();
    let r = source.prepare("a", &CancellationToken::new()).await.unwrap();
    assert_eq!(r, Readiness::TimedOut);
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    assert!(source.snapshot().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn abandoned_load_does_not_wait() {
    let mut source = CaptureSource::new(ScriptedHost::new(&[("a", Behavior::Abandon)]), opts());
    let start = Instant::now();
    let r = source.prepare("a", &CancellationToken::new()).await.unwrap();
    assert_eq!(r, Readiness::Abandoned);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn failed_capture_yields_no_snapshot() {
    let mut source =
        CaptureSource::new(ScriptedHost::new(&[("a", Behavior::CaptureFails)]), opts());
    source.prepare("a", &CancellationToken::new()).await.unwrap();
    assert!(source.snapshot().await.is_none());
    assert_eq!(source.host().captures, 1);
}

#[tokio::test(start_paused = true)]
async fn snapshot_matches_canvas() {
    let host = ScriptedHost::new(&[("a", Behavior::ReadyAfter(Duration::ZERO))]);
    let mut source = CaptureSource::new(host, opts());
    source.prepare("a", &CancellationToken::new()).await.unwrap();
    let snap = source.snapshot().await.unwrap();
    assert_eq!((snap.width(), snap.height()), (32, 18));
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_prepare() {
    let mut source = CaptureSource::new(ScriptedHost::new(&[("a", Behavior::Never)]), opts());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });
    let start = Instant::now();
    let err = source.prepare("a", &cancel).await.unwrap_err();
    assert!(matches!(err, PipelineError::Cancelled(_)));
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}
