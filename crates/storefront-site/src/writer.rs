//! Destinations for generated files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Failure to store an artifact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to write {path}: {message}")]
pub struct WriteError {
    pub path: String,
    pub message: String,
}

impl WriteError {
    fn new(path: &Path, err: impl std::fmt::Display) -> Self {
        Self {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Stores generated file contents.
pub trait FileWriter: Send + Sync {
    /// Write `contents` to `path`, replacing anything already there.
    fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError>;
}

/// Writes to the local filesystem, creating parent directories as needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl FileWriter for FsWriter {
    fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| WriteError::new(parent, e))?;
            }
        }

        fs::write(path, contents).map_err(|e| WriteError::new(path, e))?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }
}

/// Logs what would be written and discards it.
#[derive(Debug, Default)]
pub struct DryRunWriter {
    seen: Mutex<Vec<(PathBuf, usize)>>,
}

impl DryRunWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths and byte counts received so far.
    pub fn seen(&self) -> Vec<(PathBuf, usize)> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl FileWriter for DryRunWriter {
    fn write(&self, path: &Path, contents: &str) -> Result<(), WriteError> {
        tracing::info!("[dry-run] {} ({} bytes)", path.display(), contents.len());
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((path.to_path_buf(), contents.len()));
        }
        Ok(())
    }
}
