//! Plugin runtime and regression diagnostics for githelper.
//!
//! The `githelper-plugins` crate discovers plugins, tracks which ones are
//! enabled, and invokes them by name against a git working tree. Plugins come
//! from two places: compiled-in registration hooks ([`PluginSource`]) and
//! JSON manifests describing external executables in configured search
//! directories.
//!
//! Two plugins ship with the crate. `CodeBreakAnalyzer` drives `git bisect`
//! with an automated test command to find the commit that broke the build,
//! then writes a diagnostic report for it. `DiffSummarizer Bot` summarises
//! the latest commit, optionally narrowed by a query.
//!
//! # Architecture
//!
//! Every external command goes through the [`CommandRunner`] seam carried by
//! a [`Repository`] handle. The [`PluginRegistry`] owns a cached snapshot of
//! [`PluginState`]s and a [`PluginSettings`] store for the disabled set.
//! Discovery runs each registration hook inside a failure boundary, so a
//! broken plugin is logged and skipped rather than aborting the others.
//!
//! # Example
//!
//! ```rust,no_run
//! use githelper_plugins::{
//!     DiagnosticsOptions, JsonSettingsStore, NoopContext, PluginRegistry, Repository,
//!     builtin_sources,
//! };
//! use githelper_config::ReportFormat;
//!
//! let options = DiagnosticsOptions::new("/tmp/githelper/reports", ReportFormat::Markdown);
//! let mut registry = PluginRegistry::new(
//!     Repository::new("."),
//!     JsonSettingsStore::new("/tmp/githelper/settings.json"),
//! )
//! .with_sources(builtin_sources(&options));
//!
//! let message = registry
//!     .invoke("CodeBreakAnalyzer", &NoopContext)
//!     .expect("bisection runs");
//! println!("{message}");
//! ```

pub mod bisect;
pub mod builtin;
pub mod context;
pub mod diff;
pub mod error;
pub mod manifest;
pub mod plugin;
pub mod process;
pub mod registry;
pub mod report;
pub mod repository;
pub mod settings;

#[cfg(test)]
mod tests;

pub use self::bisect::{BisectEngine, BisectOutcome, BisectRequest};
pub use self::builtin::{DiagnosticsOptions, builtin_sources};
pub use self::context::{NoopContext, PluginContext, Popup, Prompt};
pub use self::error::{BisectError, PluginError, ProcessError, ReportError, SettingsError};
pub use self::plugin::{Plugin, PluginRun, PluginSource, PluginState};
pub use self::process::{CommandRunner, ProcessOutput, SystemRunner};
pub use self::registry::{PluginRegistry, SearchLocation};
pub use self::repository::Repository;
pub use self::settings::{JsonSettingsStore, PluginSettings};
