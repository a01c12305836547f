use super::*;

#[tokio::test(start_paused = true)]
async fn clock_tracks_elapsed_time_after_play() {
    let mut clock = PlaybackClock::new(Duration::from_secs(2));
    assert_eq!(clock.position(), Duration::ZERO);
    assert!(!clock.is_ended());

    clock.start();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    clock.start(); // second start is a no-op
    assert_eq!(clock.position(), Duration::from_millis(1500));
    assert!(!clock.is_ended());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(clock.is_ended());
}

#[tokio::test(start_paused = true)]
async fn stop_freezes_position() {
    let mut clock = PlaybackClock::new(Duration::from_secs(10));
    clock.start();
    tokio::time::sleep(Duration::from_secs(1)).await;
    clock.stop();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(clock.position(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn silent_narration_validates_length() {
    let mut empty = SilentNarration::new(Duration::ZERO);
    assert!(matches!(empty.load().await, Err(PipelineError::Asset(_))));

    let mut track = SilentNarration::new(Duration::from_secs(3));
    assert_eq!(track.load().await.unwrap(), Duration::from_secs(3));
    assert!(track.audio_input().is_none());
    track.play();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(track.is_ended());
}
