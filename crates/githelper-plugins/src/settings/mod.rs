//! Persistence of the disabled-plugin set.
//!
//! The registry reads the set at discovery time and updates it on
//! enable/disable. [`JsonSettingsStore`] keeps it in the shared settings
//! document under the `disabled_plugins` key and leaves every other key in
//! that document untouched.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SettingsError;

const SETTINGS_TARGET: &str = "githelper_plugins::settings";

/// Storage for the set of disabled plugin names.
///
/// Names match plugin names exactly and case-sensitively.
pub trait PluginSettings {
    /// Returns the names of all disabled plugins.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the store cannot be read.
    fn disabled_plugins(&self) -> Result<BTreeSet<String>, SettingsError>;

    /// Adds `name` to the disabled set.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the store cannot be written.
    fn disable_plugin(&mut self, name: &str) -> Result<(), SettingsError>;

    /// Removes `name` from the disabled set.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] when the store cannot be written.
    fn enable_plugin(&mut self, name: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    disabled_plugins: BTreeSet<String>,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

/// Disabled-plugin set stored in a JSON settings file.
///
/// The file is re-read on every call so separate store instances pointing at
/// the same path observe each other's writes. A missing file reads as an
/// empty set; a malformed file is logged and treated as empty, and is
/// replaced on the next write.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SettingsDocument, SettingsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    target: SETTINGS_TARGET,
                    path = %self.path.display(),
                    "settings file absent, using defaults"
                );
                return Ok(SettingsDocument::default());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        match serde_json::from_str(&text) {
            Ok(document) => Ok(document),
            Err(err) => {
                warn!(
                    target: SETTINGS_TARGET,
                    path = %self.path.display(),
                    error = %err,
                    "settings file is malformed, using defaults"
                );
                Ok(SettingsDocument::default())
            }
        }
    }

    fn save(&self, document: &SettingsDocument) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let text = serde_json::to_string_pretty(document)
            .map_err(|err| SettingsError::Serialize(Arc::new(err)))?;
        fs::write(&self.path, text).map_err(|err| self.io_error(err))
    }

    fn io_error(&self, err: io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source: Arc::new(err),
        }
    }
}

impl PluginSettings for JsonSettingsStore {
    fn disabled_plugins(&self) -> Result<BTreeSet<String>, SettingsError> {
        self.load().map(|document| document.disabled_plugins)
    }

    fn disable_plugin(&mut self, name: &str) -> Result<(), SettingsError> {
        let mut document = self.load()?;
        document.disabled_plugins.insert(name.to_owned());
        self.save(&document)
    }

    fn enable_plugin(&mut self, name: &str) -> Result<(), SettingsError> {
        let mut document = self.load()?;
        if document.disabled_plugins.remove(name) {
            self.save(&document)?;
        }
        Ok(())
    }
}
