use super::*;
use tokio::time::{Duration, Instant};

#[tokio::test(start_paused = true)]
async fn ticks_at_frame_rate() {
    let fps = Fps::new(30, 1).unwrap();
    let mut clock = FrameClock::new(fps);
    let start = Instant::now();
    clock.tick().await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    for _ in 0..30 {
        clock.tick().await;
    }
    let elapsed = start.elapsed().as_secs_f64();
    assert!((elapsed - 1.0).abs() < 1e-3, "elapsed {elapsed}");
}

#[tokio::test(start_paused = true)]
async fn skips_missed_ticks_instead_of_bursting() {
    let fps = Fps::new(10, 1).unwrap();
    let mut clock = FrameClock::new(fps);
    clock.tick().await;
    tokio::time::sleep(Duration::from_millis(550)).await;
    let before = Instant::now();
    clock.tick().await; // late tick fires immediately
    clock.tick().await; // then realigns to the schedule
    let waited = before.elapsed();
    assert!(waited > Duration::ZERO && waited <= Duration::from_millis(100));
}
