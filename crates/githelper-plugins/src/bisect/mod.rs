//! Regression bisection over the repository history.
//!
//! [`BisectEngine`] drives `git bisect` from a known-bad revision (and an
//! optional known-good one) with an automated test command, then extracts
//! the first bad commit from git's output. Every run is wrapped in a session
//! guard so the working tree leaves bisect mode on all exit paths, including
//! setup failures and launch errors.

use std::fmt;

use tracing::{debug, info};

use crate::error::BisectError;
use crate::process::{ProcessOutput, owned_args};
use crate::repository::{GIT_PROGRAM, Repository};

const BISECT_TARGET: &str = "githelper_plugins::bisect";

/// Revision bisection treats as bad when the caller supplies none.
pub const DEFAULT_BAD_REVISION: &str = "HEAD";

/// Marker git prints next to the culprit once bisection converges.
pub const FIRST_BAD_MARKER: &str = "is the first bad commit";

/// Test runner used when `pytest` is on the search path.
const PYTEST_PROGRAM: &str = "pytest";

/// Parameters for one bisection run.
///
/// # Example
///
/// ```
/// use githelper_plugins::bisect::BisectRequest;
///
/// let request = BisectRequest::default()
///     .with_known_good("v1.2.0")
///     .with_test_command("cargo test --quiet");
/// assert_eq!(request.known_bad(), "HEAD");
/// assert_eq!(request.known_good(), Some("v1.2.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BisectRequest {
    known_good: Option<String>,
    known_bad: String,
    test_command: Option<String>,
}

impl Default for BisectRequest {
    fn default() -> Self {
        Self {
            known_good: None,
            known_bad: String::from(DEFAULT_BAD_REVISION),
            test_command: None,
        }
    }
}

impl BisectRequest {
    /// Sets the revision known to pass the test.
    #[must_use]
    pub fn with_known_good(mut self, revision: impl Into<String>) -> Self {
        self.known_good = Some(revision.into());
        self
    }

    /// Sets the revision known to fail the test.
    #[must_use]
    pub fn with_known_bad(mut self, revision: impl Into<String>) -> Self {
        self.known_bad = revision.into();
        self
    }

    /// Sets the shell command used to test each candidate revision.
    #[must_use]
    pub fn with_test_command(mut self, command: impl Into<String>) -> Self {
        self.test_command = Some(command.into());
        self
    }

    /// Revision known to pass, if any.
    #[must_use]
    pub fn known_good(&self) -> Option<&str> {
        self.known_good.as_deref()
    }

    /// Revision known to fail.
    #[must_use]
    pub fn known_bad(&self) -> &str {
        &self.known_bad
    }

    /// Caller-supplied test command, if any.
    #[must_use]
    pub fn test_command(&self) -> Option<&str> {
        self.test_command.as_deref()
    }
}

/// Result of a completed bisection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BisectOutcome {
    /// The commit identified as the first bad one.
    FoundCulprit(String),
    /// Git did not name a culprit and no guess was available.
    Inconclusive,
}

impl BisectOutcome {
    /// Culprit commit id, when one was found.
    #[must_use]
    pub fn culprit(&self) -> Option<&str> {
        match self {
            Self::FoundCulprit(commit) => Some(commit),
            Self::Inconclusive => None,
        }
    }
}

impl fmt::Display for BisectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FoundCulprit(commit) => {
                write!(f, "{commit} identified as the first bad commit.")
            }
            Self::Inconclusive => f.write_str(
                "Unable to determine the first bad commit. Review bisect output manually.",
            ),
        }
    }
}

/// Runs `git bisect` sessions against one repository.
#[derive(Debug, Clone, Copy)]
pub struct BisectEngine<'a> {
    repository: &'a Repository,
}

impl<'a> BisectEngine<'a> {
    /// Creates an engine for `repository`.
    #[must_use]
    pub const fn new(repository: &'a Repository) -> Self {
        Self { repository }
    }

    /// Bisects between the request's revisions and reports the culprit.
    ///
    /// The repository is reset before starting and again on every exit path.
    /// Test failures and ambiguous output are not errors; they yield
    /// [`BisectOutcome::Inconclusive`]. A test that passes on every commit
    /// makes git name the known-bad revision itself, and without a known-good
    /// revision git refuses to run at all, which is inconclusive.
    ///
    /// # Errors
    ///
    /// Returns [`BisectError::Setup`] when a revision does not name a commit
    /// or when `git bisect start`, `bad` or `good` fails, and
    /// [`BisectError::Process`] when git itself cannot be launched for one of
    /// those steps or for the run step.
    pub fn find_breaking_commit(
        &self,
        request: &BisectRequest,
    ) -> Result<BisectOutcome, BisectError> {
        let _session = BisectSession::begin(self.repository);

        info!(
            target: BISECT_TARGET,
            known_bad = request.known_bad(),
            known_good = request.known_good(),
            "starting bisection"
        );

        // `bisect start` checks out a midpoint, so symbolic revisions such
        // as `HEAD` must be pinned to commit ids first.
        let bad = self.resolve_commit(request.known_bad())?;
        let good = request
            .known_good()
            .map(|revision| self.resolve_commit(revision))
            .transpose()?;

        let mut start = vec!["bisect", "start", bad.as_str()];
        start.extend(good.as_deref());
        self.setup_step(&start)?;
        self.setup_step(&["bisect", "bad", &bad])?;
        if let Some(good_commit) = good.as_deref() {
            self.setup_step(&["bisect", "good", good_commit])?;
        }

        let mut run = owned_args(&["bisect", "run"]);
        run.extend(test_invocation(request.test_command(), pytest_on_path()));
        let output = self.repository.run(GIT_PROGRAM, &run)?;
        debug!(
            target: BISECT_TARGET,
            status = ?output.status(),
            "bisect run finished"
        );

        let outcome = parse_first_bad(&output.combined())
            .or_else(|| self.visualize_guess())
            .map_or(BisectOutcome::Inconclusive, BisectOutcome::FoundCulprit);
        info!(target: BISECT_TARGET, %outcome, "bisection complete");
        Ok(outcome)
    }

    /// Returns the statistics and patch of `commit`.
    ///
    /// # Errors
    ///
    /// Returns [`BisectError::Command`] when `git show` exits non-zero and
    /// [`BisectError::Process`] when git cannot be launched.
    pub fn summarize_commit(&self, commit: &str) -> Result<String, BisectError> {
        let output = self.repository.git(&["show", commit, "--stat", "--patch"])?;
        if !output.is_success() {
            return Err(BisectError::Command {
                message: output.error_message("unable to summarise commit"),
            });
        }
        Ok(output.stdout().to_owned())
    }

    /// Resolves `revision` to the id of the commit it names.
    fn resolve_commit(&self, revision: &str) -> Result<String, BisectError> {
        let spec = format!("{revision}^{{commit}}");
        let output = self.repository.git(&["rev-parse", "--verify", &spec])?;
        let commit = output.stdout().trim();
        if output.is_success() && !commit.is_empty() {
            return Ok(commit.to_owned());
        }
        let fallback = format!("git rev-parse --verify {spec} failed");
        Err(BisectError::Setup {
            message: output.error_message(&fallback),
        })
    }

    fn setup_step(&self, args: &[&str]) -> Result<(), BisectError> {
        let output = self.repository.git(args)?;
        if output.is_success() {
            return Ok(());
        }
        let fallback = format!("git {} failed", args.join(" "));
        Err(BisectError::Setup {
            message: output.error_message(&fallback),
        })
    }

    /// Best-effort culprit taken from the commits still under suspicion.
    fn visualize_guess(&self) -> Option<String> {
        match self.repository.git(&["bisect", "visualize", "--oneline"]) {
            Ok(output) if output.is_success() => first_token(&output),
            Ok(output) => {
                debug!(
                    target: BISECT_TARGET,
                    status = ?output.status(),
                    "bisect visualize failed"
                );
                None
            }
            Err(err) => {
                debug!(target: BISECT_TARGET, error = %err, "bisect visualize failed");
                None
            }
        }
    }
}

/// Resets bisect state when created and again when dropped.
struct BisectSession<'a> {
    repository: &'a Repository,
}

impl<'a> BisectSession<'a> {
    fn begin(repository: &'a Repository) -> Self {
        reset(repository);
        Self { repository }
    }
}

impl Drop for BisectSession<'_> {
    fn drop(&mut self) {
        reset(self.repository);
    }
}

fn reset(repository: &Repository) {
    match repository.git(&["bisect", "reset"]) {
        Ok(output) if output.is_success() => {}
        Ok(output) => debug!(
            target: BISECT_TARGET,
            status = ?output.status(),
            "bisect reset reported failure"
        ),
        Err(err) => debug!(target: BISECT_TARGET, error = %err, "bisect reset failed"),
    }
}

/// Extracts the culprit from `git bisect run` output.
///
/// ```
/// use githelper_plugins::bisect::parse_first_bad;
///
/// let output = "running tests\nabc1234 is the first bad commit\ncommit abc1234\n";
/// assert_eq!(parse_first_bad(output).as_deref(), Some("abc1234"));
/// assert_eq!(parse_first_bad("bisect found nothing"), None);
/// ```
#[must_use]
pub fn parse_first_bad(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains(FIRST_BAD_MARKER))
        .and_then(|line| line.split_whitespace().next())
        .map(ToOwned::to_owned)
}

fn first_token(output: &ProcessOutput) -> Option<String> {
    output
        .stdout()
        .lines()
        .find_map(|line| line.split_whitespace().next())
        .map(ToOwned::to_owned)
}

/// Builds the command handed to `git bisect run`.
///
/// A caller-supplied command runs through `sh -c`. Otherwise `pytest` is
/// used directly when available, falling back to `python -m pytest`.
#[must_use]
pub fn test_invocation(custom: Option<&str>, pytest_available: bool) -> Vec<String> {
    match custom {
        Some(command) => owned_args(&["sh", "-c", command]),
        None if pytest_available => owned_args(&[PYTEST_PROGRAM]),
        None => owned_args(&["python", "-m", "pytest"]),
    }
}

fn pytest_on_path() -> bool {
    which::which(PYTEST_PROGRAM).is_ok()
}
