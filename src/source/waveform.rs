use crate::foundation::error::{WaterfallError, WaterfallResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable bytes of the visualized file.
///
/// The buffer is reference counted so export workers can share it without copying or locking.
#[derive(Clone, Debug)]
pub struct WaveformSource {
    path: Option<PathBuf>,
    bytes: Arc<[u8]>,
}

impl WaveformSource {
    /// Read the whole file at `path` into memory.
    pub fn load(path: impl AsRef<Path>) -> WaterfallResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(WaterfallError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source file not found"),
            ));
        }
        let path = std::fs::canonicalize(path).map_err(|e| WaterfallError::io(path, e))?;
        let bytes = std::fs::read(&path).map_err(|e| WaterfallError::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded source");

        let mut source = Self::from_bytes(bytes)?;
        source.path = Some(path);
        Ok(source)
    }

    /// Wrap an in-memory buffer. Empty buffers are rejected: they have no audio duration to
    /// address against.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> WaterfallResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(WaterfallError::validation("source file is empty"));
        }
        Ok(Self { path: None, bytes })
    }

    /// Canonical path the bytes were read from, if loaded from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File stem used to name exports (`"waterfall"` for in-memory sources).
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "waterfall".to_string())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the raw buffer.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/waveform.rs"]
mod tests;
