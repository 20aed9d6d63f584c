//! Unit tests for manifest plugins.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::context::NoopContext;

#[fixture]
fn dir() -> TempDir {
    TempDir::new().expect("temp dir")
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    write(path, &format!("#!/bin/sh\n{body}\n"));
    let mut permissions = fs::metadata(path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("chmod");
}

// ---------------------------------------------------------------------------
// Candidate classification
// ---------------------------------------------------------------------------

#[rstest]
fn json_file_is_a_single_unit(dir: TempDir) {
    let path = dir.path().join("lint.json");
    write(&path, "{}");
    assert_eq!(manifest_path_for(&path), Some(path.clone()));
}

#[rstest]
fn package_directory_uses_entry_point(dir: TempDir) {
    let package = dir.path().join("lint");
    write(&package.join(PACKAGE_ENTRY_POINT), "{}");
    assert_eq!(
        manifest_path_for(&package),
        Some(package.join(PACKAGE_ENTRY_POINT))
    );
}

#[rstest]
#[case::other_extension("notes.txt")]
#[case::no_extension("README")]
fn other_files_are_not_candidates(dir: TempDir, #[case] file_name: &str) {
    let path = dir.path().join(file_name);
    write(&path, "{}");
    assert_eq!(manifest_path_for(&path), None);
}

#[rstest]
fn directory_without_entry_point_is_not_a_candidate(dir: TempDir) {
    let package = dir.path().join("empty");
    fs::create_dir_all(&package).expect("mkdir");
    assert_eq!(manifest_path_for(&package), None);
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[rstest]
fn invalid_json_is_a_manifest_error(dir: TempDir) {
    let path = dir.path().join("broken.json");
    write(&path, "{ not json");
    let err = ManifestSource::new("ext.broken", &path)
        .register()
        .expect_err("should fail");
    assert!(matches!(err, PluginError::Manifest { .. }));
}

#[rstest]
fn missing_name_is_a_manifest_error(dir: TempDir) {
    let path = dir.path().join("nameless.json");
    write(&path, r#"{"executable": "true"}"#);
    let err = ManifestSource::new("ext.nameless", &path)
        .register()
        .expect_err("should fail");
    assert!(matches!(err, PluginError::Manifest { .. }));
}

#[rstest]
fn missing_relative_executable_is_rejected(dir: TempDir) {
    let path = dir.path().join("lint").join(PACKAGE_ENTRY_POINT);
    write(&path, r#"{"name": "Lint", "executable": "./run.sh"}"#);
    let err = ManifestSource::new("ext.lint", &path)
        .register()
        .expect_err("should fail");
    assert!(matches!(err, PluginError::ExecutableNotFound { .. }));
}

#[rstest]
fn bare_program_names_are_deferred_to_run_time(dir: TempDir) {
    let path = dir.path().join("echo.json");
    write(
        &path,
        r#"{"name": "Echo", "description": "Says hi.", "executable": "echo", "args": ["hi"]}"#,
    );
    let plugin = ManifestSource::new("ext.echo", &path)
        .register()
        .expect("register");
    assert_eq!(plugin.name(), "Echo");
    assert_eq!(plugin.description(), "Says hi.");
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[rstest]
fn package_plugin_runs_in_repository_root(dir: TempDir) {
    let package = dir.path().join("plugins").join("where");
    write_script(&package.join("run.sh"), "pwd");
    write(
        &package.join(PACKAGE_ENTRY_POINT),
        r#"{"name": "Where", "executable": "./run.sh"}"#,
    );
    let repo_dir = dir.path().join("repo");
    fs::create_dir_all(&repo_dir).expect("mkdir repo");

    let plugin = ManifestSource::new("ext.where", package.join(PACKAGE_ENTRY_POINT))
        .register()
        .expect("register");
    let output = plugin
        .run(&Repository::new(&repo_dir), &NoopContext)
        .expect("run");
    let expected = repo_dir.canonicalize().expect("canonical repo");
    assert_eq!(Path::new(&output).canonicalize().expect("canonical"), expected);
}

#[cfg(unix)]
#[rstest]
fn non_zero_exit_surfaces_stderr(dir: TempDir) {
    let package = dir.path().join("fail");
    write_script(&package.join("run.sh"), "echo 'lint failed' >&2\nexit 4");
    write(
        &package.join(PACKAGE_ENTRY_POINT),
        r#"{"name": "Fail", "executable": "./run.sh"}"#,
    );

    let plugin = ManifestSource::new("ext.fail", package.join(PACKAGE_ENTRY_POINT))
        .register()
        .expect("register");
    let err = plugin
        .run(&Repository::new(dir.path()), &NoopContext)
        .expect_err("should fail");
    match err {
        PluginError::NonZeroExit {
            name,
            status,
            message,
        } => {
            assert_eq!(name, "Fail");
            assert_eq!(status, 4);
            assert_eq!(message, "lint failed");
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[rstest]
fn unknown_program_fails_at_run_time(dir: TempDir) {
    let path = dir.path().join("ghost.json");
    write(
        &path,
        r#"{"name": "Ghost", "executable": "githelper-no-such-plugin-binary"}"#,
    );
    let plugin = ManifestSource::new("ext.ghost", &path)
        .register()
        .expect("register");
    let err = plugin
        .run(&Repository::new(dir.path()), &NoopContext)
        .expect_err("should fail");
    assert!(matches!(err, PluginError::Process(_)));
}
