//! # Tapline
//!
//! Intercepting proxy for line-based game protocols.
//!
//! A game client connects to Tapline instead of the game server. Tapline
//! dials the real server, splits both streams into protocol lines and runs
//! every line through the handlers of the registered plugins before
//! passing it on.
//!
//! ## Layers
//!
//! ```text
//! tapline            ← config, server, per-connection relay (this crate)
//!   tapline-proxy    ← line framing, ordered per-direction queues
//!   tapline-plugin   ← plugin registry and handler pipeline
//!   tapline-protocol ← Base-N numerals, command codec
//!   tapline-transport← WebSocket listener and upstream dialer
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tapline::prelude::*;
//!
//! # async fn run() -> Result<(), TaplineError> {
//! let registry = Arc::new(PluginRegistry::new());
//! registry.register_plugin(
//!     PluginMetadata::new("shout", "Shout", "1.0.0"),
//!     |ctx| {
//!         ctx.on_outgoing(0, |line: String, _ctx: MessageContext| async move {
//!             Ok::<_, HandlerError>(Some(line.to_uppercase()))
//!         });
//!         Ok(())
//!     },
//! )?;
//!
//! let server = TaplineServer::builder()
//!     .upstream("ws://127.0.0.1:9000")
//!     .registry(registry)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, ProxyConfig};
pub use error::TaplineError;
pub use server::{TaplineServer, TaplineServerBuilder};

pub use tapline_plugin as plugin;
pub use tapline_protocol as protocol;
pub use tapline_proxy as proxy;
pub use tapline_transport as transport;

/// Convenient re-exports of commonly used types.
///
/// ```rust
/// use tapline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ProxyConfig, TaplineError, TaplineServer, TaplineServerBuilder};

    pub use tapline_plugin::{
        Direction, Handler, HandlerError, HandlerResult, LifecycleEvent, MessageContext,
        PluginContext, PluginError, PluginId, PluginMetadata, PluginRegistry, RegistryEvent,
        ServiceDirectory,
    };
    pub use tapline_protocol::{ClientCommand, ServerCommand, WireCommand};
    pub use tapline_proxy::{Interceptor, LineFramer, Origin};
    pub use tapline_transport::{Frame, FrameKind};
}
