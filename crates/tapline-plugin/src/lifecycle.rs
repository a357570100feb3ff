//! Lifecycle events delivered to plugin hooks.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::PluginId;

/// Something that happened to a plugin or to the session it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The plugin was registered.
    Load,
    /// The plugin is being removed.
    Unload,
    /// A client connected and its upstream link is up.
    Connect,
    /// The client or the server hung up.
    Disconnect,
    /// The server confirmed who the player is.
    Login { name: String, uid: u64 },
    /// The user asked to configure this plugin.
    Configure,
    /// The plugin was disabled (`paused: true`) or re-enabled.
    Pause { paused: bool },
}

pub(crate) type Hook = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

/// Runs every hook of one plugin. A panicking hook is logged and the
/// remaining hooks still run.
pub(crate) fn fire(plugin: &PluginId, hooks: &[Hook], event: &LifecycleEvent) {
    for hook in hooks {
        if catch_unwind(AssertUnwindSafe(|| hook(event))).is_err() {
            tracing::warn!(%plugin, ?event, "lifecycle hook panicked");
        }
    }
}
