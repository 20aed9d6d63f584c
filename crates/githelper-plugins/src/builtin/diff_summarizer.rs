//! The `DiffSummarizer Bot` plugin: summarises the latest commit, narrowed
//! by an optional query, and saves a diff report.

use super::DiagnosticsOptions;
use crate::context::{PluginContext, ask, notify};
use crate::diff::{DiffAnalyzer, QueryEngine};
use crate::error::PluginError;
use crate::plugin::{Plugin, PluginRun, PluginSource};
use crate::repository::Repository;

/// Registered name of the diff summariser.
pub const DIFF_SUMMARIZER: &str = "DiffSummarizer Bot";

/// Question put to the caller's prompt capability.
pub const QUERY_PROMPT: &str = "Enter a topic or file/function to summarize:";

const DESCRIPTION: &str = "Diff and report generator for targeted queries.";
const POPUP_TITLE: &str = "Diff Summary Generated";

/// Registration hook for the diff summariser.
#[derive(Debug, Clone)]
pub struct DiffSummarizerSource {
    options: DiagnosticsOptions,
}

impl DiffSummarizerSource {
    /// Creates the hook.
    #[must_use]
    pub const fn new(options: DiagnosticsOptions) -> Self {
        Self { options }
    }
}

impl PluginSource for DiffSummarizerSource {
    fn origin(&self) -> String {
        String::from("builtin.diff_summarizer")
    }

    fn register(&self) -> Result<Plugin, PluginError> {
        Ok(Plugin::new(
            DIFF_SUMMARIZER,
            DESCRIPTION,
            DiffSummarizer {
                options: self.options.clone(),
            },
        ))
    }
}

struct DiffSummarizer {
    options: DiagnosticsOptions,
}

impl PluginRun for DiffSummarizer {
    fn run(
        &self,
        repository: &Repository,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        let query_text = ask(context, QUERY_PROMPT);
        let description = QueryEngine::describe(&QueryEngine::parse(&query_text));
        let summary = DiffAnalyzer::new(repository).analyze(&query_text)?;
        let path = self
            .options
            .report_writer()
            .write_diff_report(&description, &summary)?;

        let message = [
            String::from("Diff summary generated."),
            format!("Query: {description}"),
            format!("Files changed: {}", summary.files_changed()),
            format!("Additions: {}", summary.additions()),
            format!("Deletions: {}", summary.deletions()),
            format!("Report saved to: {}", path.display()),
        ]
        .join("\n");

        notify(context, POPUP_TITLE, &message);
        Ok(message)
    }
}
