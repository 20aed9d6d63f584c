//! Crate-level test support and BDD tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::ProcessError;
use crate::process::{CommandRunner, ProcessOutput};
use crate::repository::Repository;


type Responder = Box<dyn Fn(&str) -> Result<ProcessOutput, ProcessError> + Send + Sync>;

/// Command runner that records every invocation and answers from a script.
///
/// Invocations are recorded as a single space-joined line such as
/// `git bisect start HEAD`. The responder receives the same line.
pub(crate) struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    responder: Responder,
}

impl ScriptedRunner {
    /// Runner answering every command with `respond`.
    pub(crate) fn new(
        respond: impl Fn(&str) -> Result<ProcessOutput, ProcessError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(respond),
        })
    }

    /// Runner answering every command with an empty success.
    pub(crate) fn succeeding() -> Arc<Self> {
        Self::new(|_| Ok(ProcessOutput::success("")))
    }

    /// Recorded command lines in invocation order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Index of the first recorded call starting with `prefix`.
    pub(crate) fn position(&self, prefix: &str) -> Option<usize> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .position(|call| call.starts_with(prefix))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _cwd: &Path,
    ) -> Result<ProcessOutput, ProcessError> {
        let line = std::iter::once(program)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line.clone());
        (self.responder)(&line)
    }
}

/// Repository rooted at `root` whose commands go to `runner`.
pub(crate) fn scripted_repository(
    root: impl AsRef<Path>,
    runner: &Arc<ScriptedRunner>,
) -> Repository {
    Repository::with_runner(root.as_ref(), Arc::clone(runner) as Arc<dyn CommandRunner>)
}

/// Commit id the scripted git reports for `revision`.
pub(crate) fn commit_id(revision: &str) -> String {
    match revision {
        "HEAD" => String::from("c0ffee11"),
        "v1.0" => String::from("600d0001"),
        other => format!("{other}-id"),
    }
}

/// Answers `git rev-parse --verify <rev>^{commit}` as git does for an
/// existing revision; `None` for any other command line.
pub(crate) fn resolve_revision(line: &str) -> Option<ProcessOutput> {
    let revision = line
        .strip_prefix("git rev-parse --verify ")?
        .strip_suffix("^{commit}")?;
    Some(ProcessOutput::success(format!("{}\n", commit_id(revision))))
}
