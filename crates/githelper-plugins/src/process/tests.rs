//! Unit tests for process execution.

use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[rstest]
#[case::stderr_first(ProcessOutput::new(Some(1), "out\n", "  err \n"), "err")]
#[case::stdout_fallback(ProcessOutput::new(Some(1), " out \n", "\n"), "out")]
#[case::fallback(ProcessOutput::new(Some(1), "", ""), "no output")]
fn error_message_prefers_stderr(#[case] output: ProcessOutput, #[case] expected: &str) {
    assert_eq!(output.error_message("no output"), expected);
}

#[test]
fn combined_concatenates_stdout_then_stderr() {
    let output = ProcessOutput::new(Some(0), "a\n", "b\n");
    assert_eq!(output.combined(), "a\nb\n");
}

#[rstest]
#[case::zero(Some(0), true)]
#[case::non_zero(Some(1), false)]
#[case::signalled(None, false)]
fn success_requires_zero_status(#[case] status: Option<i32>, #[case] expected: bool) {
    assert_eq!(ProcessOutput::new(status, "", "").is_success(), expected);
}

#[test]
fn missing_executable_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = SystemRunner
        .run("githelper-definitely-missing-binary", &[], dir.path())
        .expect_err("missing binary should fail");
    assert!(matches!(err, ProcessError::ExecutableNotFound { .. }));
}

#[test]
fn missing_working_directory_is_a_spawn_error() {
    let cwd = PathBuf::from("/definitely/not/a/real/directory");
    let err = SystemRunner
        .run("sh", &owned_args(&["-c", "true"]), &cwd)
        .expect_err("missing cwd should fail");
    assert!(matches!(err, ProcessError::Spawn { .. }));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_captured_not_raised() {
    let dir = TempDir::new().expect("temp dir");
    let output = SystemRunner
        .run(
            "sh",
            &owned_args(&["-c", "echo out; echo err >&2; exit 3"]),
            dir.path(),
        )
        .expect("command runs");
    assert_eq!(output.status(), Some(3));
    assert_eq!(output.stdout(), "out\n");
    assert_eq!(output.stderr(), "err\n");
}

#[cfg(unix)]
#[test]
fn command_runs_in_requested_directory() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("marker.txt"), "x").expect("write marker");
    let output = SystemRunner
        .run("ls", &[], dir.path())
        .expect("command runs");
    assert!(output.is_success());
    assert!(output.stdout().contains("marker.txt"));
}
