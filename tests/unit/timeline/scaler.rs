use super::*;

#[test]
fn scales_reference_script_to_narration() {
    let nominal = [8.0, 10.0, 10.0, 10.0, 8.0, 8.0, 10.0];
    let scaled = compute_scaled_durations(&nominal, 80.0).unwrap();
    assert_eq!(scaled, vec![10.0, 12.5, 12.5, 12.5, 10.0, 10.0, 12.5]);
    assert!((scaled.iter().sum::<f64>() - 80.0).abs() < 1e-9);
}

#[test]
fn sum_invariant_holds_for_awkward_weights() {
    let frame = 1.0 / 30.0;
    let cases: &[(&[f64], f64)] = &[
        (&[1.0], 3.7),
        (&[0.3, 0.3, 0.3], 10.0),
        (&[7.0, 11.0, 13.0, 17.0, 19.0], 61.123),
        (&[1e-3, 5.0, 2.5], 0.9),
        (&[100.0; 40], 12.0),
    ];
    for (nominal, narration) in cases {
        let scaled = compute_scaled_durations(nominal, *narration).unwrap();
        assert_eq!(scaled.len(), nominal.len());
        assert!(scaled.iter().all(|d| *d > 0.0));
        assert!((scaled.iter().sum::<f64>() - narration).abs() < frame);

        let tl = Timeline::new(nominal, *narration).unwrap();
        assert_eq!(tl.span(tl.len() - 1).unwrap().end, *narration);
        assert_eq!(tl.span(0).unwrap().start, 0.0);
    }
}

#[test]
fn rejects_invalid_input() {
    assert!(matches!(
        compute_scaled_durations(&[1.0], 0.0),
        Err(PipelineError::Configuration(_))
    ));
    assert!(compute_scaled_durations(&[1.0], -3.0).is_err());
    assert!(compute_scaled_durations(&[], 10.0).is_err());
    assert!(compute_scaled_durations(&[1.0, 0.0], 10.0).is_err());
    assert!(compute_scaled_durations(&[1.0, -1.0], 10.0).is_err());
}

#[test]
fn spans_are_contiguous_and_locate_scenes() {
    let tl = Timeline::new(&[8.0, 10.0, 10.0, 10.0, 8.0, 8.0, 10.0], 80.0).unwrap();
    assert_eq!(tl.scale_factor(), 1.25);
    for i in 1..tl.len() {
        assert_eq!(tl.span(i - 1).unwrap().end, tl.span(i).unwrap().start);
    }
    assert_eq!(tl.scene_at(0.0), Some(0));
    assert_eq!(tl.scene_at(9.99), Some(0));
    assert_eq!(tl.scene_at(10.0), Some(1));
    assert_eq!(tl.scene_at(79.9), Some(6));
    assert_eq!(tl.scene_at(80.0), None);
    assert_eq!(tl.scene_at(-1.0), None);
    assert!(tl.span(7).is_none());
}

#[test]
fn total_frames_rounds_narration() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(Timeline::new(&[1.0], 80.0).unwrap().total_frames(fps), 2400);
    assert_eq!(Timeline::new(&[1.0], 0.01).unwrap().total_frames(fps), 1);
}
