// record.rs - Filter records: which files survive and where they land in the archive.
//
// A record names a directory inside the project, the prefix its files get
// inside the archive, and the ordered keep-list. Order of `include` is the
// order entries are written to the archive.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;

/// One filter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Directory to scan and filter, relative to the project root.
    pub source_path: String,

    /// Prefix under which kept files are stored inside the archive.
    #[serde(default)]
    pub dest_path: String,

    /// Filenames that must be preserved, in archive order.
    pub include: Vec<String>,
}

impl FileRecord {
    pub fn new(
        source_path: impl Into<String>,
        dest_path: impl Into<String>,
        include: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
            include: include.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is on the keep-list.
    pub fn keeps(&self, name: &str) -> bool {
        self.include.iter().any(|kept| kept == name)
    }

    /// The record's source directory inside `root`.
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.source_path)
    }

    /// Path of a kept file inside `root`.
    pub fn source_file(&self, root: &Path, name: &str) -> PathBuf {
        self.source_dir(root).join(name)
    }

    /// Source path of a kept file as shown in progress output (`src/main/java/Block.java`).
    pub fn display_path(&self, name: &str) -> String {
        join_slash(&self.source_path, name)
    }

    /// Archive entry name for a kept file: `dest_path` and `name` joined by one `/`.
    pub fn entry_name(&self, name: &str) -> String {
        join_slash(&self.dest_path, name)
    }

    /// Reject records that could escape the working copy or produce ambiguous entries.
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        if self.source_path.trim().is_empty() {
            return Err(self.invalid("source_path is empty"));
        }
        if !is_relative_inside(&self.source_path) {
            return Err(self.invalid("source_path must be relative and must not contain '..'"));
        }
        if !self.dest_path.is_empty() && !is_relative_inside(&self.dest_path) {
            return Err(self.invalid("dest_path must be relative and must not contain '..'"));
        }

        let mut seen = HashSet::new();
        for name in &self.include {
            if name.is_empty() || name == "." || name == ".." {
                return Err(self.invalid(format!("invalid include name '{}'", name)));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(self.invalid(format!(
                    "include name '{}' must be a plain filename",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(self.invalid(format!("duplicate include name '{}'", name)));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> WorkspaceError {
        WorkspaceError::InvalidRecord {
            source_path: self.source_path.clone(),
            reason: reason.into(),
        }
    }
}

fn join_slash(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches(['/', '\\']);
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn is_relative_inside(path: &str) -> bool {
    let path = Path::new(path);
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
