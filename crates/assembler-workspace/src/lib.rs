//! # assembler-workspace
//!
//! Working copy management for the artifact assembler.
//!
//! The assembler never touches the real project tree after reading it. It
//! snapshots the project into a disposable working copy, prunes the copy to
//! an explicit keep-list, and removes the copy once the archive is written.
//!
//! ## Key components
//!
//! - [`FileRecord`]: one filter record (source directory, archive prefix,
//!   ordered keep-list).
//! - [`WorkingCopy`]: the snapshot directory. Copies the project, filters a
//!   record's source directory, and cleans itself up.
//! - [`ExcludePatterns`]: names skipped while copying the project.

pub mod error;
pub mod excludes;
pub mod record;
pub mod working_copy;

pub use error::WorkspaceError;
pub use excludes::ExcludePatterns;
pub use record::FileRecord;
pub use working_copy::{FilterAction, FilterReport, WorkingCopy};
