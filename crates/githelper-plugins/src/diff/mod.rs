//! Diff inspection and the query interpreter used by the diff summariser.
//!
//! [`DiffAnalyzer`] reads the latest commit's diff, optionally narrows it to
//! lines mentioning a query, and counts what changed. [`QueryEngine`] turns
//! free-form text such as `function parse_args` or `commit 4f2a9c1` into a
//! structured [`Query`] with a human-readable description.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::PluginError;
use crate::repository::Repository;

const DIFF_TARGET: &str = "githelper_plugins::diff";

/// Revision range inspected by [`DiffAnalyzer::latest_commit_diff`].
pub const LATEST_COMMIT_RANGE: &str = "HEAD~1..HEAD";

/// Number of characters kept in [`DiffSummary::preview`].
pub const PREVIEW_LIMIT: usize = 2000;

/// Counts describing a unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffSummary {
    files_changed: usize,
    additions: usize,
    deletions: usize,
    preview: String,
}

impl DiffSummary {
    /// Summarises `diff`.
    ///
    /// ```
    /// use githelper_plugins::diff::DiffSummary;
    ///
    /// let diff = "diff --git a/x b/x\n--- a/x\n+++ b/x\n-old\n+new\n+extra\n";
    /// let summary = DiffSummary::from_diff(diff);
    /// assert_eq!(summary.files_changed(), 1);
    /// assert_eq!(summary.additions(), 2);
    /// assert_eq!(summary.deletions(), 1);
    /// ```
    #[must_use]
    pub fn from_diff(diff: &str) -> Self {
        let mut summary = Self {
            preview: diff.chars().take(PREVIEW_LIMIT).collect(),
            ..Self::default()
        };
        for line in diff.lines() {
            if line.starts_with("diff --git") {
                summary.files_changed += 1;
            } else if line.starts_with('+') && !line.starts_with("+++") {
                summary.additions += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                summary.deletions += 1;
            }
        }
        summary
    }

    /// Number of `diff --git` file headers.
    #[must_use]
    pub const fn files_changed(&self) -> usize {
        self.files_changed
    }

    /// Number of added lines, excluding `+++` headers.
    #[must_use]
    pub const fn additions(&self) -> usize {
        self.additions
    }

    /// Number of removed lines, excluding `---` headers.
    #[must_use]
    pub const fn deletions(&self) -> usize {
        self.deletions
    }

    /// Leading part of the analysed diff.
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// Reads and filters diffs from a repository.
#[derive(Debug, Clone, Copy)]
pub struct DiffAnalyzer<'a> {
    repository: &'a Repository,
}

impl<'a> DiffAnalyzer<'a> {
    /// Creates an analyser for `repository`.
    #[must_use]
    pub const fn new(repository: &'a Repository) -> Self {
        Self { repository }
    }

    /// Returns the diff introduced by the latest commit.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Diff`] when git exits non-zero, e.g. in a
    /// repository with a single commit, and [`PluginError::Process`] when
    /// git cannot be launched.
    pub fn latest_commit_diff(&self) -> Result<String, PluginError> {
        let output = self.repository.git(&["diff", LATEST_COMMIT_RANGE])?;
        if !output.is_success() {
            return Err(PluginError::Diff {
                message: output.error_message("git diff failed"),
            });
        }
        Ok(output.stdout().to_owned())
    }

    /// Summarises the latest commit's diff, keeping only lines that mention
    /// `query` (case-insensitively) when it is non-blank.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`latest_commit_diff`](Self::latest_commit_diff).
    pub fn analyze(&self, query: &str) -> Result<DiffSummary, PluginError> {
        let diff = self.latest_commit_diff()?;
        let filtered = filter_lines(&diff, query);
        let summary = DiffSummary::from_diff(&filtered);
        debug!(
            target: DIFF_TARGET,
            files_changed = summary.files_changed(),
            additions = summary.additions(),
            deletions = summary.deletions(),
            "diff analysed"
        );
        Ok(summary)
    }
}

/// Keeps the lines of `diff` containing `query`, ignoring case.
///
/// A blank query returns the diff unchanged.
#[must_use]
pub fn filter_lines(diff: &str, query: &str) -> String {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return diff.to_owned();
    }
    diff.lines()
        .filter(|line| line.to_lowercase().contains(&needle))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Structured interpretation of a diff query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free text, or `None` when the query was blank.
    Text(Option<String>),
    /// Function names following the word `function`.
    Function(Vec<String>),
    /// Abbreviated or full commit ids following the word `commit`.
    Commit(Vec<String>),
    /// Path-like tokens with an extension.
    File(Vec<String>),
}

static FUNCTION_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"function\s+([\w.]+)").ok());
static COMMIT_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"commit\s+([a-f0-9]{5,40})").ok());
static FILE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([\w/]+\.\w+)").ok());

/// Parses free-form diff queries.
///
/// ```
/// use githelper_plugins::diff::{Query, QueryEngine};
///
/// let query = QueryEngine::parse("Summarise function parse_args");
/// assert_eq!(query, Query::Function(vec![String::from("parse_args")]));
/// assert_eq!(QueryEngine::describe(&query), "Functions: parse_args");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Interprets `text`.
    ///
    /// Matching is case-insensitive and keyword-driven: `function` wins over
    /// `commit`, which wins over `file` or `.py`. Anything else is free
    /// text and keeps its original spelling.
    #[must_use]
    pub fn parse(text: &str) -> Query {
        let clean = text.trim().to_lowercase();
        if clean.is_empty() {
            return Query::Text(None);
        }
        if clean.contains("function") {
            return Query::Function(captures(&FUNCTION_PATTERN, &clean));
        }
        if clean.contains("commit") {
            return Query::Commit(captures(&COMMIT_PATTERN, &clean));
        }
        if clean.contains("file") || clean.contains(".py") {
            return Query::File(captures(&FILE_PATTERN, &clean));
        }
        Query::Text(Some(text.to_owned()))
    }

    /// Human-readable summary of `query`.
    #[must_use]
    pub fn describe(query: &Query) -> String {
        match query {
            Query::Function(names) if !names.is_empty() => {
                format!("Functions: {}", names.join(", "))
            }
            Query::Commit(ids) if !ids.is_empty() => format!("Commits: {}", ids.join(", ")),
            Query::File(paths) if !paths.is_empty() => format!("Files: {}", paths.join(", ")),
            Query::Text(Some(text)) => text.clone(),
            _ => String::from("General diff overview"),
        }
    }
}

fn captures(pattern: &LazyLock<Option<Regex>>, text: &str) -> Vec<String> {
    let Some(regex) = pattern.as_ref() else {
        return Vec::new();
    };
    regex
        .captures_iter(text)
        .filter_map(|capture| capture.get(1))
        .map(|group| group.as_str().to_owned())
        .collect()
}
