//! # assemble
//!
//! Builds a submission artifact from a project tree:
//!
//! 1. copies the project into a working copy (`__temp` by default)
//! 2. deletes every source file not on the keep-list
//! 3. runs the test command in the copy and stops on failure
//! 4. zips the kept sources and tests under their archive prefixes
//! 5. removes the working copy
//!
//! Exit status is 0 on success, 1 when no archive name is given, and the
//! test command's own code when it fails.

mod config;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use assembler_verify::ShellVerifier;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{AssemblyConfig, ConfigSource};
use pipeline::AssemblyOutcome;

/// Snapshot, prune, test, and zip a project.
#[derive(Parser)]
#[command(name = "assemble", version, about)]
struct Cli {
    /// Archive file name, written to the project root.
    zip_name: Option<String>,

    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Configuration file (defaults to `assemble.toml` in the project root).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remove the working copy even when the run stops early.
    #[arg(long)]
    cleanup_on_failure: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so they never interleave with progress on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli
        .project_root
        .canonicalize()
        .with_context(|| format!("Cannot open project root '{}'", cli.project_root.display()))?;

    let (mut config, source) = AssemblyConfig::resolve(&project_root, cli.config.as_deref())?;
    match &source {
        ConfigSource::File(path) => tracing::info!("using config {}", path.display()),
        ConfigSource::BuiltIn => tracing::info!("using built-in config"),
    }
    if cli.cleanup_on_failure {
        config.cleanup_on_failure = true;
    }

    let verifier =
        ShellVerifier::new(config.verify.command.as_str()).with_env(config.verify.env.clone());
    let outcome = pipeline::run(&config, &project_root, cli.zip_name.as_deref(), &verifier)?;

    match &outcome {
        AssemblyOutcome::VerificationFailed {
            working_copy: Some(path),
            ..
        }
        | AssemblyOutcome::MissingArchiveName {
            working_copy: Some(path),
        } => println!("Working copy kept at {}", path.display()),
        _ => {}
    }

    Ok(ExitCode::from(outcome.exit_code()))
}
