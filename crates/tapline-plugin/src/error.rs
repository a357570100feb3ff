//! Error types for the plugin layer.

use crate::PluginId;

/// The error a handler, hook or init callback reports.
///
/// Plugins are written independently of each other, so their failures are
/// carried as trait objects and only ever logged by the registry.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`PluginRegistry`](crate::PluginRegistry) operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The metadata carried an empty id.
    #[error("plugin metadata has no id")]
    MissingId,

    /// The metadata carried an empty name.
    #[error("plugin {0} has no name")]
    MissingName(PluginId),

    /// The metadata carried an empty version.
    #[error("plugin {0} has no version")]
    MissingVersion(PluginId),

    /// A plugin with this id is already registered.
    #[error("plugin {0} is already registered")]
    Duplicate(PluginId),

    /// No plugin with this id is registered.
    #[error("plugin {0} is not registered")]
    NotFound(PluginId),

    /// The plugin's init callback failed or panicked. Nothing it set up
    /// was kept.
    #[error("plugin {id} failed to initialise: {source}")]
    Init {
        id: PluginId,
        #[source]
        source: HandlerError,
    },
}
