//! # assembler-archive
//!
//! Writes the kept files of a working copy into a zip archive.
//!
//! - [`plan_entries`] turns filter records into the ordered list of
//!   (source file, archive entry) pairs.
//! - [`ArchiveWriter`] stages the archive next to its final path and only
//!   renames it into place once every entry has been written, so a failed
//!   run never leaves a half-written archive behind.

pub mod error;
pub mod plan;
pub mod writer;

pub use error::ArchiveError;
pub use plan::{plan_entries, ArchiveEntry};
pub use writer::{ArchiveSummary, ArchiveWriter};
