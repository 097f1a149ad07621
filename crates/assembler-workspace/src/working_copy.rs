// working_copy.rs - Disposable snapshot of the project tree.
//
// A WorkingCopy is a full copy of the project placed in a named directory
// under the project root (`<project_root>/__temp` by default). All pruning
// happens on the copy; the real project is only ever read. Every path is
// derived from the copy's root, so nothing depends on the process's current
// directory.
//
// The copy is not removed on drop. Callers decide: `cleanup()` removes it,
// simply dropping the value leaves it on disk for inspection.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WorkspaceError;
use crate::excludes::ExcludePatterns;
use crate::record::FileRecord;

/// What filtering did with one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Kept,
    Deleted,
}

/// Result of filtering one record's source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Every entry of the directory, in the order it was visited.
    pub entries: Vec<(String, FilterAction)>,
    /// Keep-list names that were not present in the directory.
    pub missing: Vec<String>,
}

impl FilterReport {
    pub fn kept(&self) -> Vec<&str> {
        self.names_with(FilterAction::Kept)
    }

    pub fn deleted(&self) -> Vec<&str> {
        self.names_with(FilterAction::Deleted)
    }

    fn names_with(&self, action: FilterAction) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// A snapshot of a project tree in an isolated directory.
#[derive(Debug)]
pub struct WorkingCopy {
    project_root: PathBuf,
    root: PathBuf,
}

impl WorkingCopy {
    /// Copy `project_root` into `project_root/<dir_name>`.
    ///
    /// Fails if the destination already exists or any part of the project
    /// cannot be read. Entries matching `excludes` are not copied.
    pub fn create(
        project_root: impl AsRef<Path>,
        dir_name: &str,
        excludes: &ExcludePatterns,
    ) -> Result<Self, WorkspaceError> {
        let project_root = project_root.as_ref().to_path_buf();
        if !project_root.is_dir() {
            return Err(WorkspaceError::NotADirectory { path: project_root });
        }

        let root = project_root.join(dir_name);
        if fs::symlink_metadata(&root).is_ok() {
            return Err(WorkspaceError::AlreadyExists { path: root });
        }

        // List the project before the destination exists so the copy never contains itself.
        let entries = sorted_entries(&project_root)?;

        fs::create_dir(&root).map_err(|source| WorkspaceError::io(&root, source))?;
        tracing::info!(
            "snapshotting {} into {}",
            project_root.display(),
            root.display()
        );

        for (name, src_path) in entries {
            copy_entry(&src_path, &root.join(&name), excludes)?;
        }

        Ok(Self { project_root, root })
    }

    /// Root of the working copy.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The project the copy was taken from.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory one level above the working copy. Archives are written here.
    pub fn parent_dir(&self) -> &Path {
        self.root.parent().unwrap_or(&self.project_root)
    }

    /// Delete every entry directly under the record's source directory that
    /// is not on its keep-list. Subdirectories are not descended into; a
    /// subdirectory that is not kept is removed as a whole.
    pub fn filter(&self, record: &FileRecord) -> Result<FilterReport, WorkspaceError> {
        let dir = record.source_dir(&self.root);
        let mut report = FilterReport::default();

        for (os_name, path) in sorted_entries(&dir)? {
            let name = os_name.to_string_lossy().into_owned();
            if record.keeps(&name) {
                tracing::debug!("keeping {}", path.display());
                report.entries.push((name, FilterAction::Kept));
                continue;
            }

            let removed = if path.is_dir() && !path.is_symlink() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|source| WorkspaceError::io(&path, source))?;
            tracing::debug!("deleted {}", path.display());
            report.entries.push((name, FilterAction::Deleted));
        }

        let kept = report.kept();
        let missing = record
            .include
            .iter()
            .filter(|name| !kept.contains(&name.as_str()))
            .cloned()
            .collect();
        report.missing = missing;
        if !report.missing.is_empty() {
            tracing::warn!(
                "{} keep-list file(s) not found in {}: {}",
                report.missing.len(),
                dir.display(),
                report.missing.join(", ")
            );
        }

        Ok(report)
    }

    /// Remove the working copy from disk.
    pub fn cleanup(self) -> Result<(), WorkspaceError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)
                .map_err(|source| WorkspaceError::io(&self.root, source))?;
            tracing::info!("removed working copy {}", self.root.display());
        }
        Ok(())
    }
}

/// Read a directory's entries as (name, path) pairs sorted by name.
///
/// Names stay `OsString` so entries that are not valid UTF-8 are copied under
/// their real names.
fn sorted_entries(dir: &Path) -> Result<Vec<(OsString, PathBuf)>, WorkspaceError> {
    let read = fs::read_dir(dir).map_err(|source| WorkspaceError::io(dir, source))?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|source| WorkspaceError::io(dir, source))?;
        entries.push((entry.file_name(), entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn copy_entry(src: &Path, dst: &Path, excludes: &ExcludePatterns) -> Result<(), WorkspaceError> {
    let is_dir = src.is_dir();
    let name = src
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    if excludes.should_exclude(&name, is_dir) {
        tracing::debug!("excluded {}", src.display());
        return Ok(());
    }

    if is_dir {
        fs::create_dir_all(dst).map_err(|source| WorkspaceError::io(dst, source))?;
        for (child_name, child) in sorted_entries(src)? {
            copy_entry(&child, &dst.join(&child_name), excludes)?;
        }
    } else {
        fs::copy(src, dst).map_err(|source| WorkspaceError::io(src, source))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_java_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("src/main/java");
        let test = dir.path().join("src/test/java");
        fs::create_dir_all(&main).unwrap();
        fs::create_dir_all(&test).unwrap();
        fs::write(main.join("Block.java"), "class Block {}\n").unwrap();
        fs::write(main.join("Extra.java"), "class Extra {}\n").unwrap();
        fs::write(test.join("TileTest.java"), "class TileTest {}\n").unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>\n").unwrap();
        dir
    }

    fn sources(include: &[&str]) -> FileRecord {
        FileRecord::new("src/main/java/", "src/", include.iter().copied())
    }

    #[test]
    fn create_copies_whole_project() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        assert_eq!(copy.root(), project.path().join("__temp"));
        assert!(copy.root().join("pom.xml").exists());
        assert!(copy.root().join("src/main/java/Block.java").exists());
        assert!(copy.root().join("src/main/java/Extra.java").exists());
        assert_eq!(
            fs::read_to_string(copy.root().join("src/test/java/TileTest.java")).unwrap(),
            "class TileTest {}\n"
        );
    }

    #[test]
    fn create_does_not_copy_itself() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        assert!(!copy.root().join("__temp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn create_preserves_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let project = create_java_project();
        let first = std::ffi::OsStr::from_bytes(b"data\xff.bin");
        let second = std::ffi::OsStr::from_bytes(b"data\xfe.bin");
        fs::write(project.path().join(first), "first").unwrap();
        fs::write(project.path().join(second), "second").unwrap();

        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        assert_eq!(fs::read_to_string(copy.root().join(first)).unwrap(), "first");
        assert_eq!(fs::read_to_string(copy.root().join(second)).unwrap(), "second");
    }

    #[test]
    fn create_fails_when_destination_exists() {
        let project = create_java_project();
        fs::create_dir(project.path().join("__temp")).unwrap();

        let result = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none());
        assert!(matches!(result, Err(WorkspaceError::AlreadyExists { .. })));
    }

    #[test]
    fn create_fails_for_missing_project() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = WorkingCopy::create(&missing, "__temp", &ExcludePatterns::none());
        assert!(matches!(result, Err(WorkspaceError::NotADirectory { .. })));
    }

    #[test]
    fn create_honors_excludes() {
        let project = create_java_project();
        fs::create_dir_all(project.path().join("target/classes")).unwrap();
        fs::write(project.path().join("target/classes/Block.class"), "cafe").unwrap();

        let excludes = ExcludePatterns::from_patterns(["target/"]);
        let copy = WorkingCopy::create(project.path(), "__temp", &excludes).unwrap();

        assert!(!copy.root().join("target").exists());
        assert!(copy.root().join("pom.xml").exists());
    }

    #[test]
    fn parent_dir_is_project_root() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        assert_eq!(copy.parent_dir(), project.path());
        assert_eq!(copy.project_root(), project.path());
    }

    #[test]
    fn filter_keeps_listed_and_deletes_the_rest() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        let report = copy.filter(&sources(&["Block.java"])).unwrap();

        assert_eq!(report.kept(), vec!["Block.java"]);
        assert_eq!(report.deleted(), vec!["Extra.java"]);
        assert!(report.missing.is_empty());
        assert!(copy.root().join("src/main/java/Block.java").exists());
        assert!(!copy.root().join("src/main/java/Extra.java").exists());
    }

    #[test]
    fn filter_never_touches_the_project() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        copy.filter(&sources(&["Block.java"])).unwrap();

        assert!(project.path().join("src/main/java/Extra.java").exists());
    }

    #[test]
    fn filter_is_idempotent() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        let record = sources(&["Block.java"]);

        let first = copy.filter(&record).unwrap();
        let second = copy.filter(&record).unwrap();

        assert_eq!(first.kept(), second.kept());
        assert!(second.deleted().is_empty());
    }

    #[test]
    fn filter_does_not_descend_into_subdirectories() {
        let project = create_java_project();
        let nested = project.path().join("src/main/java/pkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Block.java"), "package pkg;\n").unwrap();

        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        let report = copy.filter(&sources(&["Block.java"])).unwrap();

        assert_eq!(report.deleted(), vec!["Extra.java", "pkg"]);
        assert!(!copy.root().join("src/main/java/pkg").exists());
        assert!(copy.root().join("src/main/java/Block.java").exists());
    }

    #[test]
    fn filter_reports_entries_in_visit_order() {
        let project = create_java_project();
        fs::write(project.path().join("src/main/java/Tile.java"), "class Tile {}\n").unwrap();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        let report = copy.filter(&sources(&["Block.java", "Tile.java"])).unwrap();

        assert_eq!(
            report.entries,
            vec![
                ("Block.java".to_string(), FilterAction::Kept),
                ("Extra.java".to_string(), FilterAction::Deleted),
                ("Tile.java".to_string(), FilterAction::Kept),
            ]
        );
    }

    #[test]
    fn filter_keeps_listed_subdirectory_intact() {
        let project = create_java_project();
        let nested = project.path().join("src/main/java/pkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Other.java"), "package pkg;\n").unwrap();

        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        copy.filter(&sources(&["Block.java", "pkg"])).unwrap();

        assert!(copy.root().join("src/main/java/pkg/Other.java").exists());
    }

    #[test]
    fn filter_reports_missing_keep_list_names() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        let report = copy.filter(&sources(&["Block.java", "Tile.java"])).unwrap();
        assert_eq!(report.missing, vec!["Tile.java"]);
    }

    #[test]
    fn filter_fails_when_source_dir_missing() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();

        let record = FileRecord::new("src/main/kotlin", "src/", ["Block.kt"]);
        assert!(matches!(
            copy.filter(&record),
            Err(WorkspaceError::IoError { .. })
        ));
    }

    #[test]
    fn cleanup_removes_working_copy() {
        let project = create_java_project();
        let copy = WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
        let root = copy.root().to_path_buf();
        assert!(root.exists());

        copy.cleanup().unwrap();
        assert!(!root.exists());
        assert!(project.path().join("pom.xml").exists());
    }

    #[test]
    fn dropping_keeps_working_copy() {
        let project = create_java_project();
        let root = {
            let copy =
                WorkingCopy::create(project.path(), "__temp", &ExcludePatterns::none()).unwrap();
            copy.root().to_path_buf()
        };
        assert!(root.exists());
    }
}
