use super::*;
use std::time::Duration;

fn artifact() -> Artifact {
    Artifact {
        path: None,
        bytes: 4,
        frames: 1,
        duration: Duration::from_millis(33),
    }
}

#[test]
fn percent_is_monotonic_and_capped_while_running() {
    let writer = StateWriter::new(2);
    writer.frame(0.1, 40.0);
    writer.frame(0.2, 30.0);
    assert_eq!(writer.current().percent, 40.0);
    writer.frame(0.3, 250.0);
    assert_eq!(writer.current().percent, RUNNING_PERCENT_CEILING);
    writer.frame(0.4, f64::NAN);
    assert_eq!(writer.current().percent, RUNNING_PERCENT_CEILING);
    assert_eq!(writer.current().frames_pushed, 4);
}

#[test]
fn entering_a_scene_resets_scene_elapsed() {
    let writer = StateWriter::new(2);
    writer.phase(PipelinePhase::PlayingScene(0), "scene 1");
    writer.frame(1.5, 10.0);
    writer.phase(PipelinePhase::PlayingScene(0), "still scene 1");
    assert_eq!(writer.current().scene_elapsed, 1.5);
    writer.phase(PipelinePhase::PlayingScene(1), "scene 2");
    let state = writer.current();
    assert_eq!(state.current_scene, Some(1));
    assert_eq!(state.scene_elapsed, 0.0);
}

#[test]
fn completion_sets_exactly_one_hundred() {
    let writer = StateWriter::new(1);
    let handle = writer.subscribe();
    writer.frame(0.0, 50.0);
    writer.finish(PipelineOutcome::Completed(artifact()));

    let state = handle.state();
    assert_eq!(state.phase, PipelinePhase::Completed);
    assert_eq!(state.percent, 100.0);
    assert!(state.phase.is_terminal());
}

#[test]
fn failure_keeps_percent_and_reports_kind() {
    let writer = StateWriter::new(1);
    writer.frame(0.0, 12.0);
    writer.finish(PipelineOutcome::failed(&PipelineError::asset("bad mp3")));
    let state = writer.current();
    assert_eq!(state.phase, PipelinePhase::Failed);
    assert_eq!(state.percent, 12.0);
    assert_eq!(
        state.outcome,
        Some(PipelineOutcome::Failed {
            kind: ErrorKind::Asset,
            message: "asset error: bad mp3".to_owned(),
        })
    );
}

#[tokio::test]
async fn handle_wait_resolves_with_outcome() {
    let writer = StateWriter::new(1);
    let handle = writer.subscribe();
    let waiter = tokio::spawn(handle.wait());
    writer.phase(PipelinePhase::Finalizing, "encoding");
    writer.finish(PipelineOutcome::Completed(artifact()));
    let outcome = waiter.await.unwrap();
    assert_eq!(outcome.artifact(), Some(&artifact()));
}

#[tokio::test]
async fn handle_wait_reports_dropped_pipeline() {
    let writer = StateWriter::new(1);
    let handle = writer.subscribe();
    drop(writer);
    assert!(matches!(
        handle.wait().await,
        PipelineOutcome::Failed {
            kind: ErrorKind::Other,
            ..
        }
    ));
}

#[tokio::test]
async fn changed_yields_latest_state() {
    let writer = StateWriter::new(3);
    let mut handle = writer.subscribe();
    writer.status("loading narration");
    let state = handle.changed().await.unwrap();
    assert_eq!(state.status, "loading narration");
    drop(writer);
    assert!(handle.changed().await.is_none());
}
