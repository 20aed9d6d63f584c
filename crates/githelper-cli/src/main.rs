//! Entrypoint for the `githelper` binary.
//!
//! Delegates to [`githelper_cli::run`], which loads configuration,
//! initialises logging, and dispatches the requested command.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    githelper_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
