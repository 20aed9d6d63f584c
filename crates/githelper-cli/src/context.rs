//! Caller context offered to plugins run from the command line.

use githelper_plugins::{PluginContext, Prompt};
use tracing::debug;

const CONTEXT_TARGET: &str = "githelper_cli::context";

/// Answers plugin prompts with the `--query` value, when one was given.
#[derive(Debug, Clone, Default)]
pub(crate) struct CliContext {
    query: Option<String>,
}

impl CliContext {
    pub(crate) const fn new(query: Option<String>) -> Self {
        Self { query }
    }
}

impl Prompt for CliContext {
    fn prompt(&self, message: &str) -> String {
        debug!(target: CONTEXT_TARGET, message, "answering plugin prompt");
        self.query.clone().unwrap_or_default()
    }
}

impl PluginContext for CliContext {
    fn prompt(&self) -> Option<&dyn Prompt> {
        self.query.as_ref().map(|_| self as &dyn Prompt)
    }
}
