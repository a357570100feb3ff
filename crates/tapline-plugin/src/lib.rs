//! Plugins and the line transformation pipeline for Tapline.
//!
//! A plugin is registered with its [`PluginMetadata`] and an init callback.
//! The callback receives a [`PluginContext`] and uses it to add
//! [`Handler`]s (transforms that may rewrite or drop a line), observers,
//! lifecycle hooks and services.
//!
//! The [`PluginRegistry`] flattens the handlers of every enabled plugin
//! into one chain per [`Direction`], ordered by descending priority:
//!
//! ```text
//! line ──→ [prio 10, plugin A] ──→ [prio 5, plugin B] ──→ line'
//!                 │                         │
//!                 └── None: dropped, B never runs
//! ```
//!
//! A handler that fails or panics is logged and skipped; it never stops
//! the chain or the connection.

mod error;
mod handler;
mod lifecycle;
mod message;
mod metadata;
mod pipeline;
mod plugin;
mod registry;
mod service;

pub use error::{HandlerError, PluginError};
pub use handler::{Handler, HandlerResult};
pub use lifecycle::LifecycleEvent;
pub use message::{Direction, MessageContext};
pub use metadata::{PluginId, PluginInfo, PluginMetadata};
pub use plugin::PluginContext;
pub use registry::{PluginRegistry, RegistryEvent};
pub use service::ServiceDirectory;
