// error.rs - Error types for the working copy subsystem.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while snapshotting, filtering, or removing a working copy.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The working copy destination is already present on disk.
    #[error("working copy destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// The project root to snapshot is missing or not a directory.
    #[error("project root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A filter record failed validation.
    #[error("invalid file record '{source_path}': {reason}")]
    InvalidRecord { source_path: String, reason: String },
}

impl WorkspaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}
