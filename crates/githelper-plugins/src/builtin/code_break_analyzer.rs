//! The `CodeBreakAnalyzer` plugin: bisects to the commit that broke the
//! test suite and writes a diagnostic report for it.

use std::path::PathBuf;

use tracing::warn;

use super::DiagnosticsOptions;
use crate::bisect::{BisectEngine, BisectRequest};
use crate::context::{PluginContext, notify};
use crate::error::PluginError;
use crate::plugin::{Plugin, PluginRun, PluginSource};
use crate::repository::Repository;

const ANALYZER_TARGET: &str = "githelper_plugins::builtin::code_break_analyzer";

/// Registered name of the regression plugin.
pub const CODE_BREAK_ANALYZER: &str = "CodeBreakAnalyzer";

const DESCRIPTION: &str = "Finds which commit introduced app-breaking changes.";

/// Registration hook for the regression plugin.
#[derive(Debug, Clone)]
pub struct CodeBreakAnalyzerSource {
    options: DiagnosticsOptions,
}

impl CodeBreakAnalyzerSource {
    /// Creates the hook.
    #[must_use]
    pub const fn new(options: DiagnosticsOptions) -> Self {
        Self { options }
    }
}

impl PluginSource for CodeBreakAnalyzerSource {
    fn origin(&self) -> String {
        String::from("builtin.code_break_analyzer")
    }

    fn register(&self) -> Result<Plugin, PluginError> {
        Ok(Plugin::new(
            CODE_BREAK_ANALYZER,
            DESCRIPTION,
            CodeBreakAnalyzer {
                options: self.options.clone(),
            },
        ))
    }
}

struct CodeBreakAnalyzer {
    options: DiagnosticsOptions,
}

impl CodeBreakAnalyzer {
    /// A report failure leaves the analysis result intact.
    fn write_report(
        &self,
        repository: &Repository,
        commit: &str,
        summary: &str,
    ) -> Option<PathBuf> {
        self.options
            .report_writer()
            .write_diagnostic(repository, commit, summary)
            .inspect_err(|err| {
                warn!(
                    target: ANALYZER_TARGET,
                    commit,
                    error = %err,
                    "failed to write diagnostic report"
                );
            })
            .ok()
    }
}

impl PluginRun for CodeBreakAnalyzer {
    fn run(
        &self,
        repository: &Repository,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        let request = self
            .options
            .test_command()
            .map_or_else(BisectRequest::default, |command| {
                BisectRequest::default().with_test_command(command)
            });
        let outcome = BisectEngine::new(repository).find_breaking_commit(&request)?;
        let summary = outcome.to_string();

        let report_line = outcome
            .culprit()
            .and_then(|commit| self.write_report(repository, commit, &summary))
            .map(|path| format!("\nReport: {}", path.display()))
            .unwrap_or_default();
        let message = format!("{CODE_BREAK_ANALYZER}\n{summary}{report_line}");

        notify(context, CODE_BREAK_ANALYZER, &message);
        Ok(message)
    }
}
