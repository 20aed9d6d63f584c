//! Plugin discovery, enable/disable state and invocation.
//!
//! The [`PluginRegistry`] gathers candidates from compiled-in registration
//! hooks and from manifest files in its search locations, registers each one
//! inside a failure boundary, and caches the resulting snapshot sorted by
//! case-insensitive name. A broken candidate is logged and skipped; it never
//! prevents the others from loading.
//!
//! Duplicate plugin names are rejected: the first candidate in discovery
//! order keeps the name.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::context::PluginContext;
use crate::error::PluginError;
use crate::manifest::{ManifestSource, manifest_path_for};
use crate::plugin::{Plugin, PluginSource, PluginState};
use crate::repository::Repository;
use crate::settings::PluginSettings;

const REGISTRY_TARGET: &str = "githelper_plugins::registry";

/// Entries whose file name starts with this prefix are never candidates.
pub const RESERVED_PREFIX: &str = "__";

/// A directory scanned for manifest plugins.
///
/// The namespace prefixes the origin of every candidate found in the
/// directory, so plugins from different locations can be told apart in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLocation {
    root: PathBuf,
    namespace: String,
}

impl SearchLocation {
    /// Creates a search location.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    /// Directory scanned for candidates.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Logical prefix for candidate origins.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Lists the candidates in this location in lexical file-name order.
    ///
    /// A missing or unreadable directory yields no candidates.
    #[must_use]
    pub fn candidates(&self) -> Vec<ManifestSource> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(
                    target: REGISTRY_TARGET,
                    root = %self.root.display(),
                    error = %err,
                    "search location unavailable"
                );
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(err) => {
                    warn!(
                        target: REGISTRY_TARGET,
                        root = %self.root.display(),
                        error = %err,
                        "failed to read search location entry"
                    );
                    None
                }
            })
            .collect();
        paths.sort_by(|left, right| left.file_name().cmp(&right.file_name()));

        paths
            .into_iter()
            .filter_map(|path| self.candidate_for(&path))
            .collect()
    }

    fn candidate_for(&self, path: &Path) -> Option<ManifestSource> {
        let file_name = path.file_name()?.to_string_lossy();
        if file_name.starts_with(RESERVED_PREFIX) {
            return None;
        }
        let Some(manifest) = manifest_path_for(path) else {
            debug!(
                target: REGISTRY_TARGET,
                path = %path.display(),
                "entry is not a plugin candidate"
            );
            return None;
        };
        let stem = if path.is_dir() {
            file_name.into_owned()
        } else {
            path.file_stem()?.to_string_lossy().into_owned()
        };
        Some(ManifestSource::new(
            format!("{}.{stem}", self.namespace),
            manifest,
        ))
    }
}

/// Discovers, tracks and invokes plugins for one repository.
///
/// The registry is single-threaded: every operation takes `&mut self` and
/// the cached snapshot is rebuilt on demand.
///
/// # Example
///
/// ```
/// use githelper_plugins::{
///     JsonSettingsStore, NoopContext, Plugin, PluginError, PluginRegistry, PluginSource,
///     Repository,
/// };
///
/// struct Hello;
///
/// impl PluginSource for Hello {
///     fn origin(&self) -> String {
///         String::from("builtin.hello")
///     }
///
///     fn register(&self) -> Result<Plugin, PluginError> {
///         Ok(Plugin::from_fn("Hello", "Greets.", |_, _| Ok(String::from("hi"))))
///     }
/// }
///
/// let dir = std::env::temp_dir().join("githelper-doc-registry");
/// let mut registry = PluginRegistry::new(
///     Repository::new("."),
///     JsonSettingsStore::new(dir.join("settings.json")),
/// )
/// .with_source(Hello);
///
/// assert_eq!(registry.discover(false).len(), 1);
/// assert_eq!(registry.invoke("Hello", &NoopContext).unwrap(), "hi");
/// ```
pub struct PluginRegistry {
    repository: Repository,
    settings: Box<dyn PluginSettings>,
    sources: Vec<Box<dyn PluginSource>>,
    locations: Vec<SearchLocation>,
    cache: Option<Vec<PluginState>>,
}

impl PluginRegistry {
    /// Creates a registry with no candidates.
    #[must_use]
    pub fn new(repository: Repository, settings: impl PluginSettings + 'static) -> Self {
        Self {
            repository,
            settings: Box::new(settings),
            sources: Vec::new(),
            locations: Vec::new(),
            cache: None,
        }
    }

    /// Adds a compiled-in registration hook.
    #[must_use]
    pub fn with_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Adds several compiled-in registration hooks, preserving their order.
    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Box<dyn PluginSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Appends a search location scanned after the compiled-in hooks.
    #[must_use]
    pub fn with_search_location(mut self, location: SearchLocation) -> Self {
        self.locations.push(location);
        self
    }

    /// Repository handed to every plugin run.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Configured search locations in scan order.
    #[must_use]
    pub fn search_locations(&self) -> &[SearchLocation] {
        &self.locations
    }

    /// Returns the plugin snapshot, rebuilding it when `force_refresh` is set
    /// or nothing is cached.
    pub fn discover(&mut self, force_refresh: bool) -> &[PluginState] {
        if force_refresh {
            self.cache = None;
        }
        if self.cache.is_none() {
            self.cache = Some(self.build_snapshot());
        }
        self.cache.as_deref().unwrap_or(&[])
    }

    /// Marks `name` as enabled and invalidates the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Settings`] when the change cannot be persisted.
    pub fn enable(&mut self, name: &str) -> Result<(), PluginError> {
        self.settings.enable_plugin(name)?;
        self.cache = None;
        info!(target: REGISTRY_TARGET, plugin = name, "plugin enabled");
        Ok(())
    }

    /// Marks `name` as disabled and invalidates the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Settings`] when the change cannot be persisted.
    pub fn disable(&mut self, name: &str) -> Result<(), PluginError> {
        self.settings.disable_plugin(name)?;
        self.cache = None;
        info!(target: REGISTRY_TARGET, plugin = name, "plugin disabled");
        Ok(())
    }

    /// Returns the enabled plugins of the current snapshot.
    pub fn list_enabled(&mut self) -> Vec<Plugin> {
        self.discover(false)
            .iter()
            .filter(|state| state.is_enabled())
            .map(|state| state.plugin().clone())
            .collect()
    }

    /// Looks up `name` in the current snapshot regardless of its enabled
    /// flag, so callers can tell an unknown plugin from a disabled one.
    pub fn state(&mut self, name: &str) -> Option<&PluginState> {
        self.discover(false)
            .iter()
            .find(|state| state.name() == name)
    }

    /// Runs the enabled plugin called `name` and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] when no enabled plugin has that
    /// exact name, whether it is unknown or disabled. Errors reported by the
    /// plugin itself are returned unchanged.
    pub fn invoke(
        &mut self,
        name: &str,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        let plugin = self
            .discover(false)
            .iter()
            .find(|state| state.name() == name && state.is_enabled())
            .map(|state| state.plugin().clone())
            .ok_or_else(|| PluginError::NotFound {
                name: name.to_owned(),
            })?;

        info!(target: REGISTRY_TARGET, plugin = name, "invoking plugin");
        plugin.run(&self.repository, context)
    }

    fn build_snapshot(&self) -> Vec<PluginState> {
        let disabled = self.settings.disabled_plugins().unwrap_or_else(|err| {
            warn!(
                target: REGISTRY_TARGET,
                error = %err,
                "failed to read disabled plugins, treating all as enabled"
            );
            BTreeSet::new()
        });

        let mut snapshot = Snapshot::new(&disabled);
        for source in &self.sources {
            snapshot.admit(source.as_ref());
        }
        for location in &self.locations {
            for candidate in location.candidates() {
                snapshot.admit(&candidate);
            }
        }

        let mut states = snapshot.states;
        states.sort_by_cached_key(|state| state.name().to_lowercase());
        debug!(
            target: REGISTRY_TARGET,
            discovered = states.len(),
            "plugin discovery complete"
        );
        states
    }
}

/// Accumulates registered plugins during one discovery pass.
struct Snapshot<'a> {
    disabled: &'a BTreeSet<String>,
    names: HashSet<String>,
    states: Vec<PluginState>,
}

impl<'a> Snapshot<'a> {
    fn new(disabled: &'a BTreeSet<String>) -> Self {
        Self {
            disabled,
            names: HashSet::new(),
            states: Vec::new(),
        }
    }

    fn admit(&mut self, source: &dyn PluginSource) {
        let origin = source.origin();
        let plugin = match register_candidate(source, &origin) {
            Ok(plugin) => plugin,
            Err(err) => {
                warn!(
                    target: REGISTRY_TARGET,
                    origin = %origin,
                    error = %err,
                    "skipping plugin candidate"
                );
                return;
            }
        };

        if !self.names.insert(plugin.name().to_owned()) {
            warn!(
                target: REGISTRY_TARGET,
                origin = %origin,
                plugin = plugin.name(),
                "duplicate plugin name, keeping the first registration"
            );
            return;
        }

        let enabled = !self.disabled.contains(plugin.name());
        debug!(
            target: REGISTRY_TARGET,
            origin = %origin,
            plugin = plugin.name(),
            enabled,
            "registered plugin"
        );
        self.states.push(PluginState::new(plugin, enabled, origin));
    }
}

/// Runs a registration hook inside a failure boundary.
fn register_candidate(source: &dyn PluginSource, origin: &str) -> Result<Plugin, PluginError> {
    let plugin = panic::catch_unwind(AssertUnwindSafe(|| source.register())).map_err(|_| {
        PluginError::RegistrationPanicked {
            origin: origin.to_owned(),
        }
    })??;
    plugin.validate(origin)?;
    Ok(plugin)
}
