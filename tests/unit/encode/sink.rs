use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        total_frames: 3,
    }
}

fn frame(v: u8) -> Frame {
    Frame {
        width: 2,
        height: 2,
        data: vec![v; 16],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_records_and_finalizes() {
    let mut sink = InMemorySink::new();
    sink.start(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(2), &frame(2)).unwrap();

    let artifact = sink.finalize().unwrap();
    assert_eq!(artifact.frames, 2);
    assert_eq!(artifact.bytes, 32);
    assert!(artifact.path.is_none());
    assert_eq!(sink.frames()[1].0, FrameIndex(2));
    assert!(sink.is_finalized());
}

#[test]
fn push_after_finalize_is_sink_closed() {
    let mut sink = InMemorySink::new();
    sink.start(cfg()).unwrap();
    sink.finalize().unwrap();

    let err = sink.push_frame(FrameIndex(0), &frame(0)).unwrap_err();
    assert!(matches!(err, PipelineError::SinkClosed(_)));
    assert!(matches!(
        sink.finalize().unwrap_err(),
        PipelineError::SinkClosed(_)
    ));
}

#[test]
fn push_before_start_is_rejected() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(0)).is_err());
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.start(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.abort();
    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
}
