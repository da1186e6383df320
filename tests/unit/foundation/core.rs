use super::*;

#[test]
fn geometry_rejects_small_dims() {
    assert!(FrameGeometry::new(3, 48).is_err());
    assert!(FrameGeometry::new(48, 3).is_err());
    let g = FrameGeometry::new(4, 4).unwrap();
    assert_eq!(g.rgb_len(), 48);
}

#[test]
fn fps_parses_integer_and_rational() {
    assert_eq!("30".parse::<Fps>().unwrap(), Fps::new(30, 1).unwrap());
    assert_eq!(
        "30000/1001".parse::<Fps>().unwrap(),
        Fps::new(30000, 1001).unwrap()
    );
    assert!("0".parse::<Fps>().is_err());
    assert!("30/0".parse::<Fps>().is_err());
    assert!("abc".parse::<Fps>().is_err());
}

#[test]
fn fps_deserialization_is_validated() {
    let fps: Fps = serde_json::from_str(r#"{"num":24000,"den":1001}"#).unwrap();
    assert_eq!((fps.num(), fps.den()), (24000, 1001));
    assert!(serde_json::from_str::<Fps>(r#"{"num":1,"den":0}"#).is_err());
    assert!(serde_json::from_str::<Fps>(r#"{"num":0,"den":1}"#).is_err());
    assert_eq!(Fps::default(), Fps::new(30, 1).unwrap());
}

#[test]
fn fps_saturates_instead_of_wrapping() {
    let fps = Fps::new(1, u32::MAX).unwrap();
    assert_eq!(fps.timestamp_ms(FrameIndex(u64::MAX)), u64::MAX);
}

#[test]
fn fps_timestamps_round_to_nearest_ms() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.timestamp_ms(FrameIndex(0)), 0);
    assert_eq!(fps.timestamp_ms(FrameIndex(1)), 33);
    assert_eq!(fps.timestamp_ms(FrameIndex(2)), 67);
    assert_eq!(fps.timestamp_ms(FrameIndex(30)), 1000);
}

#[test]
fn frame_count_is_monotonic_in_fps() {
    let duration_ms = 1_234;
    let mut last = 0;
    for n in 1..=120 {
        let count = Fps::new(n, 1).unwrap().frame_count(duration_ms);
        assert!(count >= last, "fps {n}: {count} < {last}");
        last = count;
    }
    assert_eq!(Fps::new(10, 1).unwrap().frame_count(duration_ms), 12);
}

#[test]
fn canvas_parses_wxh() {
    assert_eq!(
        "640x360".parse::<Canvas>().unwrap(),
        Canvas::new(640, 360).unwrap()
    );
    assert!("640".parse::<Canvas>().is_err());
    assert!("0x10".parse::<Canvas>().is_err());
}
