use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::new(30, 1).unwrap().as_f64(), 30.0);
}

#[test]
fn frame_at_tolerates_nanosecond_quantized_ticks() {
    let fps = Fps::new(30, 1).unwrap();
    let period = fps.frame_period();
    for k in [1u32, 2, 29, 30, 2399, 2400] {
        let secs = (period * k).as_secs_f64();
        assert_eq!(fps.frame_at(secs), FrameIndex(u64::from(k)), "tick {k}");
    }
    assert_eq!(fps.frame_at(0.0), FrameIndex(0));
}

#[test]
fn rounding_helpers() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(80.0), 2400);
    assert_eq!(fps.secs_to_frames_floor(0.05), 1);
    assert!((fps.frames_to_secs(15) - 0.5).abs() < 1e-12);
}

#[test]
fn canvas_validation() {
    assert!(Canvas::new(1920, 1080).is_ok());
    assert!(Canvas::new(0, 1080).is_err());
    assert!(Canvas::new(1919, 1080).is_err());
    assert!(Canvas::new(70_000, 1080).is_err());
    assert_eq!(Canvas::new(4, 2).unwrap().rgba_len(), 32);
    assert_eq!(Canvas::default(), Canvas::FULL_HD);
}
