//! Domain errors raised by process execution, bisection, reports, settings
//! and plugin operations.
//!
//! All errors use `thiserror`-derived enums with structured context so callers
//! can inspect the failure programmatically. I/O errors are wrapped in `Arc`
//! to satisfy the `result_large_err` Clippy lint.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while launching an external command.
///
/// A non-zero exit status is not an error at this layer; callers inspect
/// [`ProcessOutput`](crate::process::ProcessOutput) instead.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// The program is not present on the search path.
    #[error("executable '{program}' was not found on the search path")]
    ExecutableNotFound {
        /// Program that was requested.
        program: String,
    },

    /// The program exists but could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        /// Program that was requested.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Errors raised by the bisection engine.
#[derive(Debug, Clone, Error)]
pub enum BisectError {
    /// Starting the bisection or marking a boundary failed.
    #[error("{message}")]
    Setup {
        /// Output reported by the failing `git bisect` step.
        message: String,
    },

    /// A read-only git command used by the engine failed.
    #[error("{message}")]
    Command {
        /// Output reported by the failing command.
        message: String,
    },

    /// The git binary could not be launched.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Errors raised while writing a report artefact.
#[derive(Debug, Clone, Error)]
pub enum ReportError {
    /// The report directory or file could not be written.
    #[error("failed to write report '{path}': {source}")]
    Io {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The commit diff embedded in the report could not be produced.
    #[error("failed to collect report content: {0}")]
    Bisect(#[from] BisectError),
}

/// Errors raised while reading or writing persisted plugin settings.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("settings file '{path}' is not accessible: {source}")]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The settings document could not be serialised.
    #[error("failed to serialise settings: {0}")]
    Serialize(#[source] Arc<serde_json::Error>),
}

/// Errors arising from plugin discovery and invocation.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// No enabled plugin with the requested name exists.
    #[error("plugin '{name}' is not enabled or does not exist")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },

    /// A registration hook produced a plugin that is not well formed.
    #[error("plugin candidate '{origin}' is invalid: {message}")]
    Invalid {
        /// Qualified identifier of the candidate.
        origin: String,
        /// Description of the validation failure.
        message: String,
    },

    /// A plugin manifest could not be read or parsed.
    #[error("manifest '{path}' could not be loaded: {message}")]
    Manifest {
        /// Manifest file path.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// A registration hook panicked.
    #[error("registration hook for '{origin}' panicked")]
    RegistrationPanicked {
        /// Qualified identifier of the candidate.
        origin: String,
    },

    /// A manifest plugin's executable does not exist.
    #[error("plugin '{name}' executable not found: {path}")]
    ExecutableNotFound {
        /// Plugin name.
        name: String,
        /// Path that was checked.
        path: PathBuf,
    },

    /// A manifest plugin exited with a non-zero status.
    #[error("plugin '{name}' exited with status {status}: {message}")]
    NonZeroExit {
        /// Plugin name.
        name: String,
        /// Exit status, or -1 when terminated by a signal.
        status: i32,
        /// Captured error output.
        message: String,
    },

    /// The diff inspected by a plugin could not be produced.
    #[error("unable to compute diff: {message}")]
    Diff {
        /// Output reported by git.
        message: String,
    },

    /// An external command could not be launched.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Bisection setup failed.
    #[error("bisection failed: {0}")]
    Bisect(#[from] BisectError),

    /// A report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Plugin settings could not be persisted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
