//! Command-line argument definitions for `githelper`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line interface for the githelper plugin runtime.
#[derive(Parser, Debug)]
#[command(name = "githelper", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Working tree the command operates on.
    #[arg(long, global = true, value_name = "PATH", default_value = ".")]
    pub(crate) repo: PathBuf,
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists, toggles and runs plugins.
    Plugins {
        /// The plugin action to perform.
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Finds the commit that broke the test suite.
    Bisect(BisectArgs),
}

/// Plugin management actions.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum PluginAction {
    /// Prints every discovered plugin with its state.
    List,
    /// Re-enables a disabled plugin.
    Enable {
        /// Plugin name, matched exactly.
        name: String,
    },
    /// Disables a plugin so it is no longer invoked.
    Disable {
        /// Plugin name, matched exactly.
        name: String,
    },
    /// Runs an enabled plugin and prints its result.
    Run {
        /// Plugin name, matched exactly.
        name: String,
        /// Answer handed to the plugin when it asks for input.
        #[arg(long)]
        query: Option<String>,
    },
}

/// Arguments for a direct bisection run.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct BisectArgs {
    /// Revision known to pass the test.
    #[arg(long, value_name = "REV")]
    pub(crate) good: Option<String>,
    /// Revision known to fail the test (defaults to `HEAD`).
    #[arg(long, value_name = "REV")]
    pub(crate) bad: Option<String>,
    /// Shell command deciding whether a revision is good.
    #[arg(long, value_name = "CMD")]
    pub(crate) test: Option<String>,
}
