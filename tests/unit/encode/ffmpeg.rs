use super::*;
use crate::encode::sink::FrameSink;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        total_frames: 10,
    }
}

fn frame(width: u32, height: u32, rgba: [u8; 4]) -> Frame {
    Frame {
        width,
        height,
        data: rgba.repeat((width * height) as usize),
        premultiplied: true,
    }
}

fn out_path(name: &str) -> PathBuf {
    PathBuf::from("target").join("unit_encode_ffmpeg").join(name)
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn odd_or_zero_canvas_is_encoder_unavailable() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path("odd.mp4")));
    assert!(matches!(
        sink.start(cfg(11, 10)).unwrap_err(),
        PipelineError::EncoderUnavailable(_)
    ));
    assert!(matches!(
        sink.start(cfg(0, 10)).unwrap_err(),
        PipelineError::EncoderUnavailable(_)
    ));
}

#[test]
fn push_and_finalize_require_start() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out_path("unstarted.mp4")));
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame(2, 2, [0, 0, 0, 255]))
            .unwrap_err(),
        PipelineError::Encoder(_)
    ));
    assert!(matches!(
        sink.finalize().unwrap_err(),
        PipelineError::Encoder(_)
    ));
}

#[test]
fn gaps_are_filled_and_output_is_padded() {
    if !is_ffmpeg_on_path() {
        return;
    }

    let path = out_path("gaps.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&path));
    sink.start(cfg(16, 16)).unwrap();

    sink.push_frame(FrameIndex(0), &frame(16, 16, [255, 0, 0, 255]))
        .unwrap();
    sink.push_frame(FrameIndex(3), &frame(16, 16, [0, 255, 0, 255]))
        .unwrap();
    assert_eq!(sink.frames_written(), 4);
    // Slot 3 was already written.
    sink.push_frame(FrameIndex(3), &frame(16, 16, [0, 0, 255, 255]))
        .unwrap();
    assert_eq!(sink.frames_written(), 4);

    let artifact = sink.finalize().unwrap();
    assert_eq!(artifact.frames, 10);
    assert!(artifact.bytes > 0);
    assert_eq!(artifact.path.as_deref(), Some(path.as_path()));

    assert!(matches!(
        sink.push_frame(FrameIndex(11), &frame(16, 16, [0, 0, 0, 255]))
            .unwrap_err(),
        PipelineError::SinkClosed(_)
    ));
}

#[test]
fn abort_removes_partial_output() {
    if !is_ffmpeg_on_path() {
        return;
    }

    let path = out_path("aborted.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&path));
    sink.start(cfg(16, 16)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(16, 16, [255, 255, 255, 255]))
        .unwrap();
    sink.abort();
    assert!(!path.exists());
}
