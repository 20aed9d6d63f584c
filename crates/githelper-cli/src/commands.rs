//! Command execution against the plugin runtime.

use std::io::Write;

use githelper_config::Config;
use githelper_plugins::report::ReportWriter;
use githelper_plugins::{
    BisectEngine, BisectRequest, DiagnosticsOptions, JsonSettingsStore, PluginRegistry,
    Repository, SearchLocation, builtin_sources,
};
use tracing::{info, warn};

use crate::cli::{BisectArgs, Cli, CliCommand, PluginAction};
use crate::context::CliContext;
use crate::errors::AppError;

const COMMANDS_TARGET: &str = "githelper_cli::commands";

/// Namespace prefix for manifest plugins found in configured directories.
///
/// Each directory gets `plugins.<index>` so equal file stems in different
/// directories keep distinct origins.
const PLUGIN_NAMESPACE: &str = "plugins";

/// Runs the parsed command, writing user-facing output to `stdout`.
pub(crate) fn execute<W: Write>(cli: &Cli, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    let repository = Repository::new(&cli.repo);
    match &cli.command {
        CliCommand::Plugins { action } => {
            let mut registry = build_registry(repository, config);
            run_plugin_action(action, &mut registry, stdout)
        }
        CliCommand::Bisect(args) => run_bisect(args, &repository, config, stdout),
    }
}

/// Registry with the built-in plugins and every configured plugin directory.
pub(crate) fn build_registry(repository: Repository, config: &Config) -> PluginRegistry {
    let options = DiagnosticsOptions::from_config(config);
    let registry = PluginRegistry::new(repository, JsonSettingsStore::new(config.settings_path()))
        .with_sources(builtin_sources(&options));
    config
        .plugin_dirs()
        .iter()
        .enumerate()
        .fold(registry, |with_locations, (index, dir)| {
            let namespace = format!("{PLUGIN_NAMESPACE}.{index}");
            with_locations.with_search_location(SearchLocation::new(dir.clone(), namespace))
        })
}

fn run_plugin_action<W: Write>(
    action: &PluginAction,
    registry: &mut PluginRegistry,
    stdout: &mut W,
) -> Result<(), AppError> {
    match action {
        PluginAction::List => {
            let states = registry.discover(false);
            if states.is_empty() {
                writeln!(stdout, "No plugins found.")?;
            }
            for state in states {
                let status = if state.is_enabled() { "enabled" } else { "disabled" };
                writeln!(
                    stdout,
                    "{}\t{status}\t{}",
                    state.name(),
                    state.plugin().description()
                )?;
            }
        }
        PluginAction::Enable { name } => {
            registry.enable(name)?;
            writeln!(stdout, "Plugin '{name}' enabled.")?;
        }
        PluginAction::Disable { name } => {
            registry.disable(name)?;
            writeln!(stdout, "Plugin '{name}' disabled.")?;
        }
        PluginAction::Run { name, query } => {
            let context = CliContext::new(query.clone());
            let message = registry.invoke(name, &context)?;
            writeln!(stdout, "{message}")?;
        }
    }
    Ok(())
}

fn run_bisect<W: Write>(
    args: &BisectArgs,
    repository: &Repository,
    config: &Config,
    stdout: &mut W,
) -> Result<(), AppError> {
    let request = bisect_request(args, config);
    let outcome = BisectEngine::new(repository).find_breaking_commit(&request)?;
    let summary = outcome.to_string();
    writeln!(stdout, "{summary}")?;

    let Some(commit) = outcome.culprit() else {
        return Ok(());
    };
    let writer = ReportWriter::new(config.reports_dir(), config.report_format());
    match writer.write_diagnostic(repository, commit, &summary) {
        Ok(path) => {
            info!(target: COMMANDS_TARGET, path = %path.display(), "diagnostic report saved");
            writeln!(stdout, "Report: {}", path.display())?;
        }
        Err(error) => warn!(
            target: COMMANDS_TARGET,
            commit,
            %error,
            "failed to write diagnostic report"
        ),
    }
    Ok(())
}

/// Flags win over the configured test command.
fn bisect_request(args: &BisectArgs, config: &Config) -> BisectRequest {
    let mut request = BisectRequest::default();
    if let Some(bad) = &args.bad {
        request = request.with_known_bad(bad);
    }
    if let Some(good) = &args.good {
        request = request.with_known_good(good);
    }
    if let Some(command) = args.test.as_deref().or_else(|| config.test_command()) {
        request = request.with_test_command(command);
    }
    request
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path).expect("utf-8 temp path")
    }

    #[test]
    fn plugin_directories_get_distinct_namespaces() {
        let temp = TempDir::new().expect("temp dir");
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        for (dir, name) in [(&first, "LintOne"), (&second, "LintTwo")] {
            fs::create_dir_all(dir).expect("create plugin dir");
            let manifest = format!(r#"{{"name": "{name}", "executable": "true"}}"#);
            fs::write(dir.join("lint.json"), manifest).expect("write manifest");
        }
        let config = Config {
            data_dir: utf8(temp.path().join("data")),
            plugin_dirs: vec![utf8(first), utf8(second)],
            ..Config::default()
        };

        let mut registry = build_registry(Repository::new(temp.path()), &config);

        let namespaces: Vec<&str> = registry
            .search_locations()
            .iter()
            .map(SearchLocation::namespace)
            .collect();
        assert_eq!(namespaces, ["plugins.0", "plugins.1"]);
        let first_origin = registry.state("LintOne").map(|state| state.origin().to_owned());
        let second_origin = registry.state("LintTwo").map(|state| state.origin().to_owned());
        assert_eq!(first_origin.as_deref(), Some("plugins.0.lint"));
        assert_eq!(second_origin.as_deref(), Some("plugins.1.lint"));
    }

    #[test]
    fn bisect_flags_override_configuration() {
        let config = Config {
            test_command: Some(String::from("make check")),
            ..Config::default()
        };
        let args = BisectArgs {
            good: Some(String::from("v1.0")),
            bad: None,
            test: Some(String::from("cargo test")),
        };

        let request = bisect_request(&args, &config);

        assert_eq!(request.known_bad(), "HEAD");
        assert_eq!(request.known_good(), Some("v1.0"));
        assert_eq!(request.test_command(), Some("cargo test"));
    }

    #[test]
    fn bisect_falls_back_to_configured_test_command() {
        let config = Config {
            test_command: Some(String::from("make check")),
            ..Config::default()
        };

        let request = bisect_request(&BisectArgs::default(), &config);

        assert_eq!(request.known_good(), None);
        assert_eq!(request.test_command(), Some("make check"));
    }
}
