use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WaterfallError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WaterfallError::encode("x")
            .to_string()
            .contains("encode error:")
    );
}

#[test]
fn io_names_the_failing_path() {
    let err = WaterfallError::io(
        "/nope/out.png",
        std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    );
    let msg = err.to_string();
    assert!(msg.contains("/nope/out.png"), "{msg}");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WaterfallError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
