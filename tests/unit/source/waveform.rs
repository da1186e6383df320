use super::*;

#[test]
fn load_keeps_the_canonical_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.bin");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();

    let src = WaveformSource::load(&path).unwrap();
    assert_eq!(src.bytes(), &[1, 2, 3]);
    assert_eq!(src.total_bytes(), 3);
    assert_eq!(src.path().unwrap(), std::fs::canonicalize(&path).unwrap());
    assert_eq!(src.display_name(), "data.bin");
}

#[test]
fn directories_are_not_sources() {
    let dir = tempfile::tempdir().unwrap();
    let err = WaveformSource::load(dir.path()).unwrap_err();
    assert!(matches!(err, WaterfallError::Io { .. }));
}

#[test]
fn in_memory_sources_share_their_buffer() {
    let src = WaveformSource::from_bytes(vec![9u8; 10]).unwrap();
    assert_eq!(src.display_name(), "waterfall");
    assert!(src.path().is_none());
    assert!(Arc::ptr_eq(&src.shared_bytes(), &src.clone().shared_bytes()));
}

#[test]
fn empty_buffers_are_rejected() {
    let err = WaveformSource::from_bytes(Vec::<u8>::new()).unwrap_err();
    assert!(err.to_string().contains("empty"));
}
