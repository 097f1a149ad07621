// plan.rs - Ordered archive contents derived from filter records.

use std::path::{Path, PathBuf};

use assembler_workspace::FileRecord;

/// One file to be written into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File to read, inside the working copy.
    pub source: PathBuf,
    /// Source path relative to the working copy, for progress output.
    pub display: String,
    /// Entry name inside the archive.
    pub name: String,
}

/// Entries in record order first, then keep-list order within each record.
pub fn plan_entries(root: &Path, records: &[&FileRecord]) -> Vec<ArchiveEntry> {
    records
        .iter()
        .flat_map(|record| {
            record.include.iter().map(move |name| ArchiveEntry {
                source: record.source_file(root, name),
                display: record.display_path(name),
                name: record.entry_name(name),
            })
        })
        .collect()
}
