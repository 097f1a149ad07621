//! Shell verifier: runs the configured test command line through the platform shell

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use crate::verifier::{Result, VerifyError, VerifyOutcome, Verifier};

/// Runs a command line such as `mvn clean test -B`
///
/// The command goes through `sh -c` (or `cmd /C` on Windows), inherits the
/// assembler's stdout/stderr, and is waited on with no timeout.
#[derive(Debug, Clone)]
pub struct ShellVerifier {
    command: String,
    env: BTreeMap<String, String>,
}

impl ShellVerifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: BTreeMap::new(),
        }
    }

    /// Extra environment variables for the command
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    fn shell_command(&self) -> Command {
        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&self.command);
        cmd
    }
}

impl Verifier for ShellVerifier {
    fn verify(&self, working_dir: &Path) -> Result<VerifyOutcome> {
        if self.command.trim().is_empty() {
            return Err(VerifyError::EmptyCommand);
        }
        if !working_dir.is_dir() {
            return Err(VerifyError::MissingWorkingDir(working_dir.to_path_buf()));
        }

        tracing::info!(
            "running verify command '{}' in {}",
            self.command,
            working_dir.display()
        );

        let status = self
            .shell_command()
            .current_dir(working_dir)
            .envs(&self.env)
            .status()
            .map_err(|source| VerifyError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let outcome = VerifyOutcome {
            exit_code: status.code(),
        };
        if outcome.success() {
            tracing::info!("verify command succeeded");
        } else {
            tracing::warn!("verify command failed: {:?}", status);
        }
        Ok(outcome)
    }

    fn describe(&self) -> String {
        format!("shell: {}", self.command)
    }
}
