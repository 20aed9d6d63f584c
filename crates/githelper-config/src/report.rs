use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output format for persisted diagnostic and diff reports.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportFormat {
    /// Markdown with a fenced diff block.
    #[default]
    Markdown,
    /// Minimal HTML page with an escaped `<pre>` block.
    Html,
}

impl ReportFormat {
    /// File extension used for reports in this format, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

/// Errors encountered while parsing a [`ReportFormat`] from text.
pub type ReportFormatParseError = strum::ParseError;
