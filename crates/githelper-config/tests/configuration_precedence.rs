use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use tempfile::TempDir;

use githelper_config::{Config, LogFormat, ReportFormat};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &str) -> Self {
        let guard = ENV_MUTEX.lock().expect("env mutex poisoned");
        let previous = std::env::var_os(key);
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

fn write_config(dir: &TempDir, contents: &str) -> OsString {
    let path = dir.path().join("githelper.toml");
    fs::write(&path, contents).expect("write configuration");
    path.into_os_string()
}

#[test]
fn configuration_file_values_are_loaded() {
    let _lock = ENV_MUTEX.lock().expect("env mutex poisoned");
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "log_format = \"json\"\nreport_format = \"html\"\ntest_command = \"make check\"\n",
    );

    let config = Config::load_from_iter([
        OsString::from("githelper"),
        OsString::from("--config-path"),
        path,
    ])
    .expect("configuration loads");

    assert_eq!(config.log_format(), LogFormat::Json);
    assert_eq!(config.report_format(), ReportFormat::Html);
    assert_eq!(config.test_command(), Some("make check"));
}

#[test]
fn cli_flag_overrides_configuration_file() {
    let _lock = ENV_MUTEX.lock().expect("env mutex poisoned");
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "log_filter = \"warn\"\n");

    let config = Config::load_from_iter([
        OsString::from("githelper"),
        OsString::from("--config-path"),
        path,
        OsString::from("--log-filter"),
        OsString::from("debug"),
    ])
    .expect("configuration loads");

    assert_eq!(config.log_filter(), "debug");
}

#[test]
fn environment_overrides_configuration_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "report_format = \"markdown\"\n");
    let _env = EnvOverride::set_var("GITHELPER_REPORT_FORMAT", "html");

    let config = Config::load_from_iter([
        OsString::from("githelper"),
        OsString::from("--config-path"),
        path,
    ])
    .expect("configuration loads");

    assert_eq!(config.report_format(), ReportFormat::Html);
}
