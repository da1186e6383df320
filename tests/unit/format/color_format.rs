use super::*;

fn err_msg(s: &str) -> String {
    ColorFormatSpec::parse(s).unwrap_err().to_string()
}

#[test]
fn default_matches_bgrx() {
    let parsed = ColorFormatSpec::parse(DEFAULT_COLOR_FORMAT).unwrap();
    assert_eq!(parsed, ColorFormatSpec::default());
    assert_eq!(parsed.color_bytes(), 4);
    assert_eq!(parsed.used_color_bytes(), 3);
    assert_eq!(parsed.unused_color_bytes(), 1);
    assert_eq!(parsed.mode(), ColorMode::Rgb);
}

#[test]
fn parse_is_case_insensitive_and_trims() {
    let spec = ColorFormatSpec::parse("  RgBxX ").unwrap();
    assert_eq!(spec.serialize(), "rgbxx");
    assert_eq!(spec.color_bytes(), 5);
}

#[test]
fn grayscale_mode() {
    let spec = ColorFormatSpec::parse("xwx").unwrap();
    assert_eq!(spec.mode(), ColorMode::Grayscale);
    assert_eq!(spec.used_color_bytes(), 1);
    assert_eq!(spec.unused_color_bytes(), 2);
    assert_eq!(
        spec.tags(),
        &[ChannelTag::Unused, ChannelTag::White, ChannelTag::Unused]
    );
}

#[test]
fn white_excludes_rgb_tags() {
    assert!(err_msg("wr").contains("grayscale"));
    assert!(err_msg("ww").contains("2 were given"));
}

#[test]
fn rgb_requires_exactly_one_of_each() {
    assert!(err_msg("xx").contains("minimum of 1"));
    assert!(err_msg("rrgb").contains("red"));
    assert!(err_msg("rggb").contains("green"));
    assert!(err_msg("rgbb").contains("blue"));
    assert!(err_msg("rg").contains("0 were given"));
}

#[test]
fn rejects_foreign_characters() {
    assert!(err_msg("rgbq").contains("'q'"));
    assert!(err_msg("r g b").contains("' '"));
    assert!(!ColorFormatSpec::is_valid(""));
}

#[test]
fn serialize_round_trips() {
    for s in ["bgrx", "rgb", "w", "xxw", "xbxgxr", "BGRX"] {
        let parsed = ColorFormatSpec::parse(s).unwrap();
        let again = ColorFormatSpec::parse(&parsed.serialize()).unwrap();
        assert_eq!(again, parsed, "{s}");
    }
}

#[test]
fn serde_uses_the_string_form() {
    let spec: ColorFormatSpec = serde_json::from_str("\"xrgb\"").unwrap();
    assert_eq!(spec.serialize(), "xrgb");
    assert_eq!(serde_json::to_string(&spec).unwrap(), "\"xrgb\"");
    assert!(serde_json::from_str::<ColorFormatSpec>("\"rgbw\"").is_err());
}
