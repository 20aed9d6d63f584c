//! Manifest-described external plugins.
//!
//! Search locations hold plugins written in any language. Each one is
//! described by a JSON [`PluginManifest`] naming the executable to run. A
//! single-unit plugin is a `<stem>.json` file; a package is a directory with a
//! `plugin.json` entry point next to its executable. Running the plugin
//! spawns the executable inside the repository root and returns its trimmed
//! standard output.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::PluginContext;
use crate::error::PluginError;
use crate::plugin::{Plugin, PluginRun, PluginSource};
use crate::repository::Repository;

const MANIFEST_TARGET: &str = "githelper_plugins::manifest";

/// File name of a package's entry-point manifest.
pub const PACKAGE_ENTRY_POINT: &str = "plugin.json";

/// Extension recognised for single-unit manifests.
pub const MANIFEST_EXTENSION: &str = "json";

/// Declarative description of an external plugin.
///
/// # Example
///
/// ```
/// use githelper_plugins::manifest::PluginManifest;
///
/// let manifest: PluginManifest = serde_json::from_str(
///     r#"{"name": "Lint", "executable": "./lint.sh", "args": ["--quick"]}"#,
/// )
/// .unwrap();
/// assert_eq!(manifest.name(), "Lint");
/// assert_eq!(manifest.description(), "");
/// assert_eq!(manifest.args(), ["--quick"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    name: String,
    #[serde(default)]
    description: String,
    executable: PathBuf,
    #[serde(default)]
    args: Vec<String>,
}

impl PluginManifest {
    /// Creates a manifest without extra arguments.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        executable: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    /// Sets the arguments passed to the executable.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Manifest`] when the file cannot be read or is
    /// not a valid manifest.
    pub fn load(path: &Path) -> Result<Self, PluginError> {
        let manifest_error = |message: String| PluginError::Manifest {
            path: path.to_path_buf(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|err| manifest_error(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| manifest_error(err.to_string()))
    }

    /// Plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line summary, empty when the manifest omits it.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Executable as written in the manifest.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Returns the manifest path for a search-location entry, or `None` when the
/// entry is neither a single-unit manifest nor a package.
#[must_use]
pub fn manifest_path_for(entry: &Path) -> Option<PathBuf> {
    if entry.is_dir() {
        let entry_point = entry.join(PACKAGE_ENTRY_POINT);
        return entry_point.is_file().then_some(entry_point);
    }
    let is_manifest = entry
        .extension()
        .is_some_and(|extension| extension == MANIFEST_EXTENSION);
    (entry.is_file() && is_manifest).then(|| entry.to_path_buf())
}

/// Registration hook for a manifest found in a search location.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    origin: String,
    path: PathBuf,
}

impl ManifestSource {
    /// Creates a hook for the manifest at `path`.
    #[must_use]
    pub fn new(origin: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }

    /// Manifest file backing this hook.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PluginSource for ManifestSource {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn register(&self) -> Result<Plugin, PluginError> {
        let manifest = PluginManifest::load(&self.path)?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        let program = resolve_program(&manifest, base, &self.path)?;
        debug!(
            target: MANIFEST_TARGET,
            origin = %self.origin,
            plugin = manifest.name(),
            program = %program,
            "registered manifest plugin"
        );
        let runner = ExternalPlugin {
            name: manifest.name.clone(),
            program,
            args: manifest.args.clone(),
        };
        Ok(Plugin::new(manifest.name, manifest.description, runner))
    }
}

/// Bare program names are looked up on `PATH` when run; anything with a
/// directory component is resolved against the manifest's directory and
/// must already exist.
fn resolve_program(
    manifest: &PluginManifest,
    base: &Path,
    manifest_path: &Path,
) -> Result<String, PluginError> {
    let executable = manifest.executable();
    let program = if executable.is_absolute() || executable.components().count() > 1 {
        let resolved = base.join(executable);
        if !resolved.is_file() {
            return Err(PluginError::ExecutableNotFound {
                name: manifest.name().to_owned(),
                path: resolved,
            });
        }
        resolved
    } else {
        executable.to_path_buf()
    };

    program
        .to_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| PluginError::Manifest {
            path: manifest_path.to_path_buf(),
            message: String::from("executable path is not valid UTF-8"),
        })
}

/// Run capability spawning a manifest plugin's executable.
#[derive(Debug, Clone)]
struct ExternalPlugin {
    name: String,
    program: String,
    args: Vec<String>,
}

impl PluginRun for ExternalPlugin {
    fn run(
        &self,
        repository: &Repository,
        _context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        let output = repository.run(&self.program, &self.args)?;
        if output.is_success() {
            return Ok(output.stdout().trim().to_owned());
        }
        Err(PluginError::NonZeroExit {
            name: self.name.clone(),
            status: output.status().unwrap_or(-1),
            message: output.error_message("plugin produced no output"),
        })
    }
}

#[cfg(test)]
mod tests;
