//! Raw source bytes and time-to-offset addressing.

/// Playback time to byte offset mapping.
pub mod address;
/// The in-memory source buffer.
pub mod waveform;
