//! Verification step for the artifact assembler.
//!
//! The only thing the assembler needs from a test run is its exit status.
//! The [`Verifier`] trait captures that contract; [`ShellVerifier`] runs a
//! configured command line through the platform shell.

pub mod shell;
pub mod verifier;

pub use shell::ShellVerifier;
pub use verifier::{Result, VerifyError, VerifyOutcome, Verifier};
