//! The plugin contract: descriptors, run capabilities and registration hooks.
//!
//! A [`Plugin`] is an immutable descriptor pairing a unique name and a
//! one-line description with a [`PluginRun`] capability. Plugins are produced
//! by registration hooks ([`PluginSource`]) during discovery and wrapped in a
//! [`PluginState`] that carries their enabled flag.

use std::fmt;
use std::sync::Arc;

use crate::context::PluginContext;
use crate::error::PluginError;
use crate::repository::Repository;

/// The callable entry point of a plugin.
///
/// Closures with the matching signature implement this trait, so simple
/// plugins can be written inline with [`Plugin::from_fn`].
pub trait PluginRun {
    /// Runs the plugin against `repository` and returns a human-readable
    /// result.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] describing why the plugin could not
    /// complete.
    fn run(
        &self,
        repository: &Repository,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError>;
}

impl<F> PluginRun for F
where
    F: Fn(&Repository, &dyn PluginContext) -> Result<String, PluginError>,
{
    fn run(
        &self,
        repository: &Repository,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        self(repository, context)
    }
}

/// Immutable plugin descriptor.
///
/// # Example
///
/// ```
/// use githelper_plugins::{NoopContext, Plugin, Repository};
///
/// let plugin = Plugin::from_fn("Echo", "Returns a greeting.", |_, _| {
///     Ok(String::from("hello"))
/// });
/// let repository = Repository::new(".");
/// assert_eq!(plugin.run(&repository, &NoopContext).unwrap(), "hello");
/// ```
#[derive(Clone)]
pub struct Plugin {
    name: String,
    description: String,
    runner: Arc<dyn PluginRun>,
}

impl Plugin {
    /// Creates a descriptor around an existing run capability.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        runner: impl PluginRun + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            runner: Arc::new(runner),
        }
    }

    /// Creates a descriptor from a closure.
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, description: impl Into<String>, run: F) -> Self
    where
        F: Fn(&Repository, &dyn PluginContext) -> Result<String, PluginError> + 'static,
    {
        Self::new(name, description, run)
    }

    /// Unique display name used for lookup.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line summary.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Invokes the plugin's run capability.
    ///
    /// # Errors
    ///
    /// Propagates whatever the plugin reports.
    pub fn run(
        &self,
        repository: &Repository,
        context: &dyn PluginContext,
    ) -> Result<String, PluginError> {
        self.runner.run(repository, context)
    }

    /// Checks the descriptor is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Invalid`] naming `origin` when the name is
    /// blank or contains control characters.
    pub fn validate(&self, origin: &str) -> Result<(), PluginError> {
        let invalid = |message: &str| PluginError::Invalid {
            origin: origin.to_owned(),
            message: message.to_owned(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("plugin name must not be blank"));
        }
        if self.name.chars().any(char::is_control) {
            return Err(invalid("plugin name must not contain control characters"));
        }
        Ok(())
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A discovered plugin together with its enabled flag.
#[derive(Debug, Clone)]
pub struct PluginState {
    plugin: Plugin,
    enabled: bool,
    origin: String,
}

impl PluginState {
    /// Wraps a plugin discovered from `origin`.
    #[must_use]
    pub fn new(plugin: Plugin, enabled: bool, origin: impl Into<String>) -> Self {
        Self {
            plugin,
            enabled,
            origin: origin.into(),
        }
    }

    /// The wrapped descriptor.
    #[must_use]
    pub const fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    /// Shorthand for the plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    /// Whether the plugin may be invoked.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Qualified identifier of the candidate that registered the plugin.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// A registration hook producing one plugin.
///
/// Compiled-in plugins implement this directly; manifest plugins found in
/// search locations are wrapped in
/// [`ManifestSource`](crate::manifest::ManifestSource). The registry calls
/// [`register`](Self::register) inside a failure boundary, so a failing hook
/// only removes its own plugin from discovery.
pub trait PluginSource {
    /// Qualified identifier used in diagnostics, e.g. `builtin.bisect`.
    fn origin(&self) -> String;

    /// Produces the plugin descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] when the plugin cannot be constructed.
    fn register(&self) -> Result<Plugin, PluginError>;
}
