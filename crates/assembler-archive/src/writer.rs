// writer.rs - Staged zip writer.
//
// The archive is written to `<name>.partial` beside the final path and
// renamed into place by `finish()`, replacing any existing archive in one
// step. If the writer is dropped before `finish()` (an entry failed to read,
// the process is unwinding) or `finish()` itself fails, the partial file is
// removed and any previous archive is left as it was.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ArchiveError;

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Final archive path.
    pub path: PathBuf,
    /// Entry names in write order.
    pub entries: Vec<String>,
    /// Archive size in bytes.
    pub bytes: u64,
    /// Hex SHA-256 of the archive file.
    pub sha256: String,
}

pub struct ArchiveWriter {
    path: PathBuf,
    partial_path: PathBuf,
    zip: Option<ZipWriter<File>>,
    options: SimpleFileOptions,
    entries: Vec<String>,
}

impl ArchiveWriter {
    /// Open a new archive that will end up at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .ok_or_else(|| ArchiveError::InvalidPath { path: path.clone() })?;

        let mut partial_name = file_name.to_os_string();
        partial_name.push(".partial");
        let partial_path = path.with_file_name(partial_name);

        let file = File::create(&partial_path).map_err(|source| ArchiveError::IoError {
            path: partial_path.clone(),
            source,
        })?;
        tracing::debug!("staging archive at {}", partial_path.display());

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        Ok(Self {
            path,
            partial_path,
            zip: Some(ZipWriter::new(file)),
            options,
            entries: Vec::new(),
        })
    }

    /// Copy `source` into the archive under `entry_name`.
    pub fn add_file(&mut self, source: &Path, entry_name: &str) -> Result<(), ArchiveError> {
        if self.entries.iter().any(|name| name == entry_name) {
            return Err(ArchiveError::DuplicateEntry {
                name: entry_name.to_string(),
            });
        }

        let mut input = File::open(source).map_err(|source_err| ArchiveError::IoError {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let zip = self.zip.as_mut().ok_or_else(|| ArchiveError::InvalidPath {
            path: self.partial_path.clone(),
        })?;
        zip.start_file(entry_name, self.options)
            .map_err(|source| ArchiveError::ZipError {
                path: self.partial_path.clone(),
                source,
            })?;
        io::copy(&mut input, zip).map_err(|source_err| ArchiveError::IoError {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        tracing::debug!("added {} as {}", source.display(), entry_name);
        self.entries.push(entry_name.to_string());
        Ok(())
    }

    /// Finalize the zip, move it into place, and hash it.
    pub fn finish(mut self) -> Result<ArchiveSummary, ArchiveError> {
        let zip = self.zip.take().ok_or_else(|| ArchiveError::InvalidPath {
            path: self.partial_path.clone(),
        })?;
        if let Err(err) = self.commit(zip) {
            self.discard_partial();
            return Err(err);
        }

        let (sha256, bytes) = sha256_file(&self.path)?;
        tracing::info!(
            "wrote {} ({} entries, {} bytes)",
            self.path.display(),
            self.entries.len(),
            bytes
        );

        Ok(ArchiveSummary {
            path: self.path.clone(),
            entries: std::mem::take(&mut self.entries),
            bytes,
            sha256,
        })
    }

    fn commit(&self, zip: ZipWriter<File>) -> Result<(), ArchiveError> {
        let file = zip.finish().map_err(|source| ArchiveError::ZipError {
            path: self.partial_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| ArchiveError::IoError {
            path: self.partial_path.clone(),
            source,
        })?;
        drop(file);

        // rename replaces an existing file at the destination.
        fs::rename(&self.partial_path, &self.path).map_err(|source| ArchiveError::IoError {
            path: self.path.clone(),
            source,
        })
    }

    fn discard_partial(&self) {
        if let Err(e) = fs::remove_file(&self.partial_path) {
            tracing::warn!(
                "could not remove partial archive {}: {}",
                self.partial_path.display(),
                e
            );
        }
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if let Some(zip) = self.zip.take() {
            drop(zip);
            self.discard_partial();
        }
    }
}

fn sha256_file(path: &Path) -> Result<(String, u64), ArchiveError> {
    let mut file = File::open(path).map_err(|source| ArchiveError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut file, &mut hasher).map_err(|source| ArchiveError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((format!("{:x}", hasher.finalize()), bytes))
}
