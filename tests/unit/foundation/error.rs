use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PipelineError::asset("x")
            .to_string()
            .contains("asset error:")
    );
    assert!(
        PipelineError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        PipelineError::encoder_unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        PipelineError::sink_closed("x")
            .to_string()
            .contains("sink closed:")
    );
    assert!(
        PipelineError::encoder("x")
            .to_string()
            .contains("encoder error:")
    );
}

#[test]
fn kind_matches_variant() {
    assert_eq!(PipelineError::asset("x").kind(), ErrorKind::Asset);
    assert_eq!(
        PipelineError::encoder_unavailable("x").kind(),
        ErrorKind::EncoderUnavailable
    );
    assert_eq!(PipelineError::cancelled("x").kind(), ErrorKind::Cancelled);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PipelineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}
