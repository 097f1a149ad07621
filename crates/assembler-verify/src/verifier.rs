//! Core Verifier trait and outcome type

use std::path::Path;
use thiserror::Error;

/// Errors that prevent a verification command from producing an exit status
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verify command is empty")]
    EmptyCommand,

    #[error("failed to spawn verify command '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("working directory does not exist: {0}")]
    MissingWorkingDir(std::path::PathBuf),
}

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Exit status of a finished verification run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Process exit code. `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl VerifyOutcome {
    pub fn from_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code the assembler should terminate with after this outcome.
    ///
    /// Codes in `1..=255` pass through unchanged. Anything that cannot be
    /// reported verbatim (signal termination, out-of-range codes) becomes 1.
    pub fn process_exit_code(&self) -> u8 {
        match self.exit_code {
            Some(0) => 0,
            Some(code) => u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1),
            None => 1,
        }
    }
}

/// Something that can check a prepared working copy
///
/// Implementations run synchronously and must not return until the check
/// has finished. A failing check is an `Ok` outcome with a nonzero code;
/// `Err` is reserved for not being able to run the check at all.
pub trait Verifier {
    /// Run the check with `working_dir` as its current directory
    fn verify(&self, working_dir: &Path) -> Result<VerifyOutcome>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}
