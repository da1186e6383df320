//! PCM audio synthesized from the raw source bytes.

/// Audio settings, container building and WAVE output.
pub mod container;
