//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use githelper_plugins::{BisectError, PluginError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error(transparent)]
    Bisect(#[from] BisectError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
