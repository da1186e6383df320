//! Channel-format mini-language (`"bgrx"`, `"w"`, ...).

/// Parser and typed representation of format strings.
pub mod color_format;
