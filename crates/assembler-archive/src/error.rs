// error.rs - Error types for archive writing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The zip encoder rejected an operation.
    #[error("zip error in {path}: {source}")]
    ZipError {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    /// Two kept files map to the same archive entry.
    #[error("duplicate archive entry '{name}'")]
    DuplicateEntry { name: String },

    /// The archive path has no file name component.
    #[error("invalid archive path: {path}")]
    InvalidPath { path: PathBuf },
}
