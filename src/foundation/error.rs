use std::path::{Path, PathBuf};

/// Convenience result type used across the crate.
pub type WaterfallResult<T> = Result<T, WaterfallError>;

/// Top-level error taxonomy.
///
/// Cancellation is not an error: a cancelled export is reported through
/// [`ExportOutcome::Cancelled`](crate::ExportOutcome::Cancelled), not as a failure.
#[derive(thiserror::Error, Debug)]
pub enum WaterfallError {
    /// Invalid user-provided configuration (format string, geometry, audio settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// A filesystem operation failed on `path`.
    #[error("io error at '{}': {source}", path.display())]
    Io {
        /// Path the failing operation was acting on.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The external media encoder failed or is unavailable.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WaterfallError {
    /// Build a [`WaterfallError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WaterfallError::Io`] value for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`WaterfallError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
