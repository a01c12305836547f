use super::*;

#[tokio::test]
async fn missing_file_is_asset_error() {
    let mut track = NarrationTrack::new("target/definitely/missing/narration.mp3");
    let err = track.load().await.unwrap_err();
    assert!(matches!(err, PipelineError::Asset(_)));
    assert!(track.audio_input().is_none());
    assert_eq!(track.duration(), Duration::ZERO);
}

#[test]
fn unloaded_track_reports_zero_position() {
    let track = NarrationTrack::new("narration.mp3");
    assert_eq!(track.path(), Path::new("narration.mp3"));
    assert_eq!(track.position(), Duration::ZERO);
    assert!(!track.is_ended());
}

#[test]
fn staging_paths_live_in_temp_dir() {
    let p = NarrationTrack::staging_path();
    assert!(p.starts_with(std::env::temp_dir()));
    assert_eq!(p.extension().and_then(|e| e.to_str()), Some("f32le"));
}
