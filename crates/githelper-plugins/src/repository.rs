//! Handle to the working tree that plugins operate on.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ProcessError;
use crate::process::{CommandRunner, ProcessOutput, SystemRunner, owned_args};

/// Program name used for every version-control invocation.
pub const GIT_PROGRAM: &str = "git";

/// A working-tree root paired with the runner used to shell out inside it.
///
/// Plugins receive a shared reference to the handle and never own the
/// working tree; the caller decides which repository they act on.
#[derive(Clone)]
pub struct Repository {
    root: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Repository {
    /// Creates a handle that runs real processes.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_runner(root, Arc::new(SystemRunner))
    }

    /// Creates a handle backed by a custom runner.
    #[must_use]
    pub fn with_runner(root: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    /// Root directory of the working tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs `git` with the given arguments in the repository root.
    ///
    /// # Errors
    ///
    /// Propagates launch failures from the underlying [`CommandRunner`].
    pub fn git(&self, args: &[&str]) -> Result<ProcessOutput, ProcessError> {
        self.run(GIT_PROGRAM, &owned_args(args))
    }

    /// Runs an arbitrary program in the repository root.
    ///
    /// # Errors
    ///
    /// Propagates launch failures from the underlying [`CommandRunner`].
    pub fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, ProcessError> {
        self.runner.run(program, args, &self.root)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
