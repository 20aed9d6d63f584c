//! End-to-end tests for the CLI runtime with an injected configuration.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::{Command, ExitCode};

use camino::Utf8PathBuf;
use githelper_config::Config;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

const ANALYZER_LINE: &str =
    "CodeBreakAnalyzer\tenabled\tFinds which commit introduced app-breaking changes.";
const SUMMARIZER_LINE: &str =
    "DiffSummarizer Bot\tenabled\tDiff and report generator for targeted queries.";

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

struct Harness {
    dir: TempDir,
    config: Config,
}

impl Harness {
    fn utf8(path: &Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("utf-8 temp path")
    }

    fn with_plugin_dir(mut self) -> Self {
        let plugins = self.dir.path().join("plugins");
        fs::create_dir_all(&plugins).expect("create plugin dir");
        self.config.plugin_dirs = vec![Self::utf8(&plugins)];
        self
    }

    fn write_manifest(&self, file_name: &str, contents: &str) {
        fs::write(self.dir.path().join("plugins").join(file_name), contents)
            .expect("write manifest");
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let mut argv = vec![OsString::from("githelper")];
        argv.extend(args.iter().map(OsString::from));
        let loader = StaticConfigLoader {
            config: self.config.clone(),
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit = run_with_loader(argv, &mut stdout, &mut stderr, &loader);
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("stdout utf8"),
            stderr: String::from_utf8(stderr).expect("stderr utf8"),
        }
    }
}

#[fixture]
fn harness() -> Harness {
    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        data_dir: Harness::utf8(&dir.path().join("data")),
        ..Config::default()
    };
    Harness { dir, config }
}

#[rstest]
fn lists_builtin_plugins_in_order(harness: Harness) {
    let outcome = harness.run(&["plugins", "list"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, format!("{ANALYZER_LINE}\n{SUMMARIZER_LINE}\n"));
    assert!(outcome.stderr.is_empty());
}

#[rstest]
fn disabling_persists_across_runs(harness: Harness) {
    let disabled = harness.run(&["plugins", "disable", "CodeBreakAnalyzer"]);
    assert_eq!(disabled.exit, ExitCode::SUCCESS);
    assert_eq!(disabled.stdout, "Plugin 'CodeBreakAnalyzer' disabled.\n");
    assert!(harness.config.settings_path().is_file());

    let listed = harness.run(&["plugins", "list"]);
    assert_eq!(
        listed.stdout,
        format!(
            "{}\n{SUMMARIZER_LINE}\n",
            ANALYZER_LINE.replace("enabled", "disabled")
        )
    );

    let invoked = harness.run(&["plugins", "run", "CodeBreakAnalyzer"]);
    assert_eq!(invoked.exit, ExitCode::FAILURE);
    assert_eq!(
        invoked.stderr,
        "plugin 'CodeBreakAnalyzer' is not enabled or does not exist\n"
    );

    let enabled = harness.run(&["plugins", "enable", "CodeBreakAnalyzer"]);
    assert_eq!(enabled.exit, ExitCode::SUCCESS);
    let relisted = harness.run(&["plugins", "list"]);
    assert_eq!(relisted.stdout, format!("{ANALYZER_LINE}\n{SUMMARIZER_LINE}\n"));
}

#[rstest]
fn unknown_plugin_fails_with_message(harness: Harness) {
    let outcome = harness.run(&["plugins", "run", "Nonexistent"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert_eq!(
        outcome.stderr,
        "plugin 'Nonexistent' is not enabled or does not exist\n"
    );
}

#[cfg(unix)]
#[rstest]
fn runs_manifest_plugin_from_configured_directory(harness: Harness) {
    let harness = harness.with_plugin_dir();
    harness.write_manifest(
        "echo.json",
        r#"{"name": "Echo", "description": "Says hello.", "executable": "echo", "args": ["hello from echo"]}"#,
    );

    let listed = harness.run(&["plugins", "list"]);
    assert!(listed.stdout.contains("Echo\tenabled\tSays hello.\n"));

    let repo = harness.dir.path().display().to_string();
    let outcome = harness.run(&["plugins", "run", "Echo", "--repo", &repo]);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "hello from echo\n");
}

#[rstest]
fn missing_subcommand_reports_usage(harness: Harness) {
    let outcome = harness.run(&[]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("Usage"));
}

#[rstest]
fn help_is_written_to_stdout(harness: Harness) {
    let outcome = harness.run(&["--help"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("plugins"));
    assert!(outcome.stdout.contains("bisect"));
    assert!(outcome.stderr.is_empty());
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("spawn git");
    assert!(output.status.success(), "git {args:?} failed");
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

#[rstest]
fn bisect_reports_culprit_and_writes_report(harness: Harness) {
    if Command::new("git").arg("--version").output().is_err() {
        return;
    }
    let repo = harness.dir.path().join("repo");
    fs::create_dir_all(&repo).expect("create repo dir");
    git(&repo, &["init", "--quiet"]);
    git(&repo, &["config", "user.name", "Bisect Test"]);
    git(&repo, &["config", "user.email", "bisect@example.com"]);
    git(&repo, &["config", "commit.gpgsign", "false"]);
    for (status, message) in [("ok", "initial"), ("broken", "break"), ("broken", "later")] {
        fs::write(repo.join("status.txt"), format!("{status} {message}\n")).expect("write");
        git(&repo, &["add", "status.txt"]);
        git(&repo, &["commit", "--quiet", "-m", message]);
    }
    let first = git(&repo, &["rev-list", "--max-parents=0", "HEAD"]);
    let breaking = git(&repo, &["rev-parse", "HEAD~1"]);

    let repo_arg = repo.display().to_string();
    let outcome = harness.run(&[
        "bisect",
        "--repo",
        &repo_arg,
        "--good",
        &first,
        "--test",
        "grep -q '^ok' status.txt",
    ]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS, "stderr: {}", outcome.stderr);
    let report = harness
        .config
        .reports_dir()
        .join(format!("diagnostic_{breaking}.md"));
    assert_eq!(
        outcome.stdout,
        format!("{breaking} identified as the first bad commit.\nReport: {report}\n")
    );
    let contents = fs::read_to_string(&report).expect("report written");
    assert!(contents.starts_with(&format!("# Diagnostic Report for {breaking}")));
}
