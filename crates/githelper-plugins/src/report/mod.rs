//! Markdown and HTML report artefacts.
//!
//! Reports are written under a single directory that is created on demand.
//! Diagnostic reports are named after the culprit commit so re-running the
//! analyser overwrites the previous report for the same commit; diff reports
//! are named after the Unix time they were generated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use githelper_config::ReportFormat;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::bisect::BisectEngine;
use crate::diff::DiffSummary;
use crate::error::ReportError;
use crate::repository::Repository;

const REPORT_TARGET: &str = "githelper_plugins::report";

/// Number of characters of the commit diff embedded in a diagnostic report.
pub const DIAGNOSTIC_DIFF_LIMIT: usize = 5000;

/// Writes report files in one format to one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWriter {
    dir: PathBuf,
    format: ReportFormat,
}

impl ReportWriter {
    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Directory receiving reports.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Format of written reports.
    #[must_use]
    pub const fn format(&self) -> ReportFormat {
        self.format
    }

    /// Writes `diagnostic_<commit>` describing the culprit commit and returns
    /// its path.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Bisect`] when the commit cannot be shown and
    /// [`ReportError::Io`] when the file cannot be written.
    pub fn write_diagnostic(
        &self,
        repository: &Repository,
        commit: &str,
        summary: &str,
    ) -> Result<PathBuf, ReportError> {
        let diff = BisectEngine::new(repository).summarize_commit(commit)?;
        let excerpt: String = diff.chars().take(DIAGNOSTIC_DIFF_LIMIT).collect();
        let content = match self.format {
            ReportFormat::Markdown => diagnostic_markdown(commit, summary, &excerpt),
            ReportFormat::Html => diagnostic_html(commit, summary, &excerpt),
        };
        let stem = format!("diagnostic_{}", file_safe(commit));
        self.persist(&stem, &content)
    }

    /// Writes `diff_report_<unix-seconds>` for a diff summary and returns its
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the file cannot be written.
    pub fn write_diff_report(
        &self,
        query: &str,
        summary: &DiffSummary,
    ) -> Result<PathBuf, ReportError> {
        self.write_diff_report_at(query, summary, OffsetDateTime::now_utc())
    }

    pub(crate) fn write_diff_report_at(
        &self,
        query: &str,
        summary: &DiffSummary,
        generated: OffsetDateTime,
    ) -> Result<PathBuf, ReportError> {
        let timestamp = generated
            .format(&Rfc3339)
            .unwrap_or_else(|_| generated.unix_timestamp().to_string());
        let content = match self.format {
            ReportFormat::Markdown => diff_markdown(query, summary, &timestamp),
            ReportFormat::Html => diff_html(query, summary, &timestamp),
        };
        let stem = format!("diff_report_{}", generated.unix_timestamp());
        self.persist(&stem, &content)
    }

    fn persist(&self, stem: &str, content: &str) -> Result<PathBuf, ReportError> {
        let io_error = |path: &Path, err: io::Error| ReportError::Io {
            path: path.to_path_buf(),
            source: Arc::new(err),
        };
        fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, err))?;
        let path = self
            .dir
            .join(format!("{stem}.{}", self.format.extension()));
        fs::write(&path, content).map_err(|err| io_error(&path, err))?;
        info!(
            target: REPORT_TARGET,
            path = %path.display(),
            format = %self.format,
            "report written"
        );
        Ok(path)
    }
}

fn diagnostic_markdown(commit: &str, summary: &str, diff: &str) -> String {
    format!(
        "# Diagnostic Report for {commit}\n\n**Summary:** {summary}\n\n```diff\n{diff}\n```\n"
    )
}

fn diagnostic_html(commit: &str, summary: &str, diff: &str) -> String {
    let commit = escape_html(commit);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Diagnostic Report for \
         {commit}</title></head>\n<body>\n<h1>Diagnostic Report for {commit}</h1>\n\
         <p><strong>Summary:</strong> {}</p>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(summary),
        escape_html(diff),
    )
}

fn diff_markdown(query: &str, summary: &DiffSummary, timestamp: &str) -> String {
    format!(
        "# Diff Report ({timestamp})\n\n**Query:** {query}  \n**Files Changed:** {}  \n\
         **Additions:** {}  \n**Deletions:** {}\n\n---\n\n### Diff Preview\n\n\
         ```diff\n{}\n```\n",
        summary.files_changed(),
        summary.additions(),
        summary.deletions(),
        summary.preview(),
    )
}

fn diff_html(query: &str, summary: &DiffSummary, timestamp: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Diff Report</title></head>\n\
         <body>\n<h2>Diff Report ({timestamp})</h2>\n<p><b>Query:</b> {}</p>\n\
         <p><b>Files Changed:</b> {}</p>\n<p><b>Additions:</b> {}</p>\n\
         <p><b>Deletions:</b> {}</p>\n<pre>{}</pre>\n</body>\n</html>\n",
        escape_html(query),
        summary.files_changed(),
        summary.additions(),
        summary.deletions(),
        escape_html(summary.preview()),
    )
}

/// Escapes the characters HTML treats as markup.
///
/// ```
/// use githelper_plugins::report::escape_html;
///
/// assert_eq!(escape_html("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Replaces characters that could escape the report directory.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
