//! Shared configuration for the githelper binary and plugin runtime.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, then a TOML
//! file (`--config-path` or `GITHELPER_CONFIG_PATH`), then `GITHELPER_*`
//! environment variables, then command-line flags.

mod defaults;
mod logging;
mod report;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    APP_DIRECTORY, DEFAULT_LOG_FILTER, default_data_dir, default_log_filter,
    default_log_filter_string, default_log_format, default_report_format,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoError;
pub use report::{ReportFormat, ReportFormatParseError};

/// File name of the persisted settings document inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Directory name for generated reports inside the data directory.
pub const REPORTS_DIR_NAME: &str = "reports";

/// Runtime configuration for githelper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GITHELPER")]
pub struct Config {
    /// `tracing` filter expression applied to emitted logs.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for emitted logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Directory holding the settings file and generated reports.
    #[serde(default = "default_data_dir")]
    #[ortho_config(default = default_data_dir())]
    pub data_dir: Utf8PathBuf,
    /// Extra directories scanned for manifest plugins, in search order.
    #[serde(default)]
    #[ortho_config(merge_strategy = "append")]
    pub plugin_dirs: Vec<Utf8PathBuf>,
    /// Format used when persisting reports.
    #[serde(default = "default_report_format")]
    #[ortho_config(default = default_report_format())]
    pub report_format: ReportFormat,
    /// Shell command used as the bisection test when none is supplied.
    #[serde(default)]
    pub test_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            data_dir: default_data_dir(),
            plugin_dirs: Vec::new(),
            report_format: default_report_format(),
            test_command: None,
        }
    }
}

impl Config {
    /// Filter expression for the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Selected log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Directory holding persisted state.
    #[must_use]
    pub fn data_dir(&self) -> &Utf8Path {
        self.data_dir.as_path()
    }

    /// Additional manifest plugin directories.
    #[must_use]
    pub fn plugin_dirs(&self) -> &[Utf8PathBuf] {
        &self.plugin_dirs
    }

    /// Format for persisted reports.
    #[must_use]
    pub const fn report_format(&self) -> ReportFormat {
        self.report_format
    }

    /// Configured default bisection test command, if any.
    #[must_use]
    pub fn test_command(&self) -> Option<&str> {
        self.test_command.as_deref()
    }

    /// Location of the persisted settings document.
    #[must_use]
    pub fn settings_path(&self) -> Utf8PathBuf {
        self.data_dir.join(SETTINGS_FILE_NAME)
    }

    /// Directory receiving generated reports.
    #[must_use]
    pub fn reports_dir(&self) -> Utf8PathBuf {
        self.data_dir.join(REPORTS_DIR_NAME)
    }
}
