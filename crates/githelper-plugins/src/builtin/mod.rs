//! Plugins compiled into the runtime.
//!
//! [`builtin_sources`] returns the registration hooks for every built-in
//! plugin in a fixed order. Hosts pass them to
//! [`PluginRegistry::with_sources`](crate::registry::PluginRegistry::with_sources)
//! so they are discovered ahead of any manifest plugin.

mod code_break_analyzer;
mod diff_summarizer;

use std::path::{Path, PathBuf};

use githelper_config::{Config, ReportFormat};

use crate::plugin::PluginSource;
use crate::report::ReportWriter;

pub use code_break_analyzer::{CODE_BREAK_ANALYZER, CodeBreakAnalyzerSource};
pub use diff_summarizer::{DIFF_SUMMARIZER, DiffSummarizerSource, QUERY_PROMPT};

/// Settings shared by the built-in diagnostic plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsOptions {
    reports_dir: PathBuf,
    report_format: ReportFormat,
    test_command: Option<String>,
}

impl DiagnosticsOptions {
    /// Creates options writing reports to `reports_dir`.
    #[must_use]
    pub fn new(reports_dir: impl Into<PathBuf>, report_format: ReportFormat) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            report_format,
            test_command: None,
        }
    }

    /// Derives options from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            reports_dir: config.reports_dir().into_std_path_buf(),
            report_format: config.report_format(),
            test_command: config.test_command().map(ToOwned::to_owned),
        }
    }

    /// Sets the bisection test command.
    #[must_use]
    pub fn with_test_command(mut self, command: impl Into<String>) -> Self {
        self.test_command = Some(command.into());
        self
    }

    /// Directory receiving reports.
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Format of written reports.
    #[must_use]
    pub const fn report_format(&self) -> ReportFormat {
        self.report_format
    }

    /// Bisection test command, if configured.
    #[must_use]
    pub fn test_command(&self) -> Option<&str> {
        self.test_command.as_deref()
    }

    pub(crate) fn report_writer(&self) -> ReportWriter {
        ReportWriter::new(&self.reports_dir, self.report_format)
    }
}

/// Registration hooks for every built-in plugin.
#[must_use]
pub fn builtin_sources(options: &DiagnosticsOptions) -> Vec<Box<dyn PluginSource>> {
    vec![
        Box::new(CodeBreakAnalyzerSource::new(options.clone())),
        Box::new(DiffSummarizerSource::new(options.clone())),
    ]
}
