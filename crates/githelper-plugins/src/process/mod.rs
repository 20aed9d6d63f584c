//! Synchronous execution of external commands.
//!
//! [`CommandRunner`] is the seam every git invocation passes through. The
//! production implementation, [`SystemRunner`], spawns the program in the
//! requested working directory, waits for it to exit, and captures its
//! output. A non-zero exit status is a normal outcome that callers inspect;
//! only a failure to launch the program is reported as an error.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::debug;

use crate::error::ProcessError;

/// Tracing target for process execution.
const PROCESS_TARGET: &str = "githelper_plugins::process";

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    status: Option<i32>,
    stdout: String,
    stderr: String,
}

impl ProcessOutput {
    /// Creates an output record from its parts.
    #[must_use]
    pub fn new(status: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Shorthand for a successful exit with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::new(Some(0), stdout, String::new())
    }

    /// Shorthand for a failed exit with the given status and stderr.
    #[must_use]
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self::new(Some(status), String::new(), stderr)
    }

    /// Exit code, or `None` when the process was terminated by a signal.
    #[must_use]
    pub const fn status(&self) -> Option<i32> {
        self.status
    }

    /// Returns `true` when the process exited with status zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, Some(0))
    }

    /// Captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Standard output followed by standard error.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        text
    }

    /// Trimmed stderr if non-empty, otherwise trimmed stdout, otherwise
    /// `fallback`.
    #[must_use]
    pub fn error_message(&self, fallback: &str) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .unwrap_or(fallback)
            .to_owned()
    }
}

/// Runs external programs on behalf of the plugin runtime.
///
/// Implementations block until the program exits. Tests substitute scripted
/// runners to drive the bisection protocol without a real repository.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `program` with `args` inside `cwd` and captures its output.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ExecutableNotFound`] when the program is not
    /// on the search path and [`ProcessError::Spawn`] for any other launch
    /// failure. A non-zero exit status is returned as `Ok`.
    fn run(&self, program: &str, args: &[String], cwd: &Path)
    -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<ProcessOutput, ProcessError> {
        if !cwd.is_dir() {
            return Err(ProcessError::Spawn {
                program: program.to_owned(),
                source: Arc::new(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory '{}' does not exist", cwd.display()),
                )),
            });
        }

        debug!(
            target: PROCESS_TARGET,
            program,
            ?args,
            cwd = %cwd.display(),
            "running command"
        );

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| launch_error(program, err))?;

        let result = ProcessOutput::new(
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        debug!(
            target: PROCESS_TARGET,
            program,
            status = ?result.status(),
            stdout_bytes = result.stdout().len(),
            stderr_bytes = result.stderr().len(),
            "command exited"
        );

        Ok(result)
    }
}

fn launch_error(program: &str, err: io::Error) -> ProcessError {
    if err.kind() == io::ErrorKind::NotFound {
        ProcessError::ExecutableNotFound {
            program: program.to_owned(),
        }
    } else {
        ProcessError::Spawn {
            program: program.to_owned(),
            source: Arc::new(err),
        }
    }
}

/// Converts string slices into the owned argument vector taken by
/// [`CommandRunner::run`].
#[must_use]
pub fn owned_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_owned()).collect()
}

#[cfg(test)]
mod tests;
