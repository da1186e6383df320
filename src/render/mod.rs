//! Byte-to-pixel frame synthesis and export-time post-processing.

/// Frame buffer and synthesizer.
pub mod frame;
/// Stretch / letterbox scaling.
pub mod resize;
/// SVG watermark overlay.
pub mod watermark;
