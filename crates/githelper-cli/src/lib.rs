//! Command-line runtime for githelper.
//!
//! The runtime splits configuration flags from command tokens, loads the
//! layered configuration, installs logging, and dispatches `plugins` and
//! `bisect` commands to the plugin runtime. IO streams and the configuration
//! loader are injectable so the whole flow can be exercised from tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod commands;
mod config;
mod context;
mod errors;
mod telemetry;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

const CLI_TARGET: &str = "githelper_cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(&split.command_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            let config = loader.load(&split.config_arguments)?;
            telemetry::initialise(&config)?;
            commands::execute(&cli, &config, stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        // `--help` and `--version` surface as errors that belong on stdout.
        Err(AppError::CliUsage(usage)) if !usage.use_stderr() => {
            report(stdout, &usage);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            report(stderr, &failure);
            ExitCode::FAILURE
        }
    }
}

fn report<W: Write>(sink: &mut W, message: &dyn std::fmt::Display) {
    let text = message.to_string();
    if let Err(write_error) = writeln!(sink, "{}", text.trim_end()).and_then(|()| sink.flush()) {
        error!(target: CLI_TARGET, error = %write_error, "failed to write command output");
    }
}

#[cfg(test)]
mod tests;
