use camino::Utf8PathBuf;
use std::env;

use crate::logging::LogFormat;
use crate::report::ReportFormat;

/// Directory name used beneath the platform configuration directory.
pub const APP_DIRECTORY: &str = "githelper";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binary.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default format for persisted reports.
#[must_use]
pub fn default_report_format() -> ReportFormat {
    ReportFormat::Markdown
}

/// Computes the default data directory holding settings and reports.
///
/// Prefers the platform configuration directory and falls back to the
/// temporary directory when none is available or it is not valid UTF-8.
#[must_use]
pub fn default_data_dir() -> Utf8PathBuf {
    let mut base = dirs::config_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .unwrap_or_else(fallback_base_directory);
    base.push(APP_DIRECTORY);
    base
}

fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}
