//! Optional capabilities a caller can expose to plugins.
//!
//! Frontends differ in what they can offer: a GUI can show a popup, a CLI may
//! only be able to pass a pre-supplied answer to a prompt. Plugins query the
//! capability they need and fall back quietly when it is absent.

/// Shows a titled message to the user.
pub trait Popup {
    /// Displays `body` under `title`.
    fn show_popup(&self, title: &str, body: &str);
}

/// Asks the user for a line of text.
pub trait Prompt {
    /// Returns the answer to `message`; an empty string means no answer.
    fn prompt(&self, message: &str) -> String;
}

/// Caller context passed to every plugin run.
///
/// Every capability defaults to `None`, so an implementation only overrides
/// what its frontend supports.
pub trait PluginContext {
    /// Popup capability, when the frontend can display one.
    fn popup(&self) -> Option<&dyn Popup> {
        None
    }

    /// Prompt capability, when the frontend can answer one.
    fn prompt(&self) -> Option<&dyn Prompt> {
        None
    }
}

/// Context exposing no capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopContext;

impl PluginContext for NoopContext {}

/// Shows a popup through `context` when it supports one.
pub(crate) fn notify(context: &dyn PluginContext, title: &str, body: &str) {
    if let Some(popup) = context.popup() {
        popup.show_popup(title, body);
    }
}

/// Asks `context` for text, returning an empty string when it cannot answer.
pub(crate) fn ask(context: &dyn PluginContext, message: &str) -> String {
    context
        .prompt()
        .map(|prompt| prompt.prompt(message))
        .unwrap_or_default()
}
