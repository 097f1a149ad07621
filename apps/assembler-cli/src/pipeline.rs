// pipeline.rs - Snapshot, filter, verify, package, clean up.
//
// Each step is fallible and runs strictly after the previous one. Filesystem
// and archive failures propagate as errors. The two expected early exits
// (failing tests, no archive name) are returned as an `AssemblyOutcome` so
// `main` alone decides the process exit code.
//
// Progress lines go to stdout as each step begins, so the last line printed
// tells which step a failed run stopped in.

use std::path::{Path, PathBuf};

use anyhow::Context;
use assembler_archive::{plan_entries, ArchiveSummary, ArchiveWriter};
use assembler_verify::Verifier;
use assembler_workspace::{FilterAction, WorkingCopy};

use crate::config::AssemblyConfig;

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum AssemblyOutcome {
    /// The archive was written and the working copy removed.
    Packaged(ArchiveSummary),
    /// The verify command exited nonzero. No archive was written.
    VerificationFailed {
        exit_code: u8,
        working_copy: Option<PathBuf>,
    },
    /// No archive name was supplied. No archive was written.
    MissingArchiveName { working_copy: Option<PathBuf> },
}

impl AssemblyOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Packaged(_) => 0,
            Self::VerificationFailed { exit_code, .. } => *exit_code,
            Self::MissingArchiveName { .. } => 1,
        }
    }
}

/// Run the whole pipeline against `project_root`.
pub fn run(
    config: &AssemblyConfig,
    project_root: &Path,
    archive_name: Option<&str>,
    verifier: &dyn Verifier,
) -> anyhow::Result<AssemblyOutcome> {
    println!("Starting artifact build...");

    println!("Copying to temp directory...");
    let working_copy = WorkingCopy::create(project_root, &config.work_dir, &config.excludes())
        .context("Failed to copy project into working copy")?;

    println!("Deleting spurious source files...");
    let report = working_copy
        .filter(&config.sources)
        .context("Failed to filter source files")?;
    for (name, action) in &report.entries {
        match action {
            FilterAction::Kept => println!("    Kept {}", name),
            FilterAction::Deleted => println!("    Deleted {}", name),
        }
    }

    println!("Executing tests...");
    tracing::info!("verifier: {}", verifier.describe());
    let verified = verifier
        .verify(working_copy.root())
        .context("Failed to run verify command")?;
    if !verified.success() {
        let exit_code = verified.process_exit_code();
        let working_copy = finish_early(config, working_copy)?;
        return Ok(AssemblyOutcome::VerificationFailed {
            exit_code,
            working_copy,
        });
    }

    println!("Compiling artifact zip...");
    let Some(archive_name) = archive_name.filter(|name| !name.trim().is_empty()) else {
        println!("Requires zip name argument.");
        let working_copy = finish_early(config, working_copy)?;
        return Ok(AssemblyOutcome::MissingArchiveName { working_copy });
    };

    println!("Writing zip file {}", archive_name);
    let archive_path = working_copy.parent_dir().join(archive_name);
    let mut writer = ArchiveWriter::create(&archive_path)
        .with_context(|| format!("Failed to create archive '{}'", archive_path.display()))?;
    for entry in plan_entries(working_copy.root(), &config.records()) {
        println!("    Adding {}", entry.display);
        writer
            .add_file(&entry.source, &entry.name)
            .with_context(|| format!("Failed to add '{}' to archive", entry.display))?;
    }
    let summary = writer.finish().context("Failed to finalize archive")?;
    println!(
        "    {} entries, {} bytes, sha256 {}",
        summary.entries.len(),
        summary.bytes,
        summary.sha256
    );

    println!("Removing temp directory...");
    working_copy
        .cleanup()
        .context("Failed to remove working copy")?;
    println!("Done.");

    Ok(AssemblyOutcome::Packaged(summary))
}

/// Apply the cleanup policy on an early exit. Returns the path left behind, if any.
fn finish_early(
    config: &AssemblyConfig,
    working_copy: WorkingCopy,
) -> anyhow::Result<Option<PathBuf>> {
    if config.cleanup_on_failure {
        println!("Removing temp directory...");
        working_copy
            .cleanup()
            .context("Failed to remove working copy")?;
        return Ok(None);
    }

    let root = working_copy.root().to_path_buf();
    tracing::warn!("working copy left at {}", root.display());
    Ok(Some(root))
}
