//! `TaplineServer` builder and accept loop.
//!
//! This is the entry point for running the proxy. It ties the layers
//! together: transport → interception queues → plugin registry.

use std::sync::Arc;

use tapline_plugin::PluginRegistry;
use tapline_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ProxyConfig, TaplineError};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) upstream: String,
    pub(crate) registry: Arc<PluginRegistry>,
}

/// Builder for configuring and starting a Tapline server.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tapline::prelude::*;
///
/// # async fn run() -> Result<(), TaplineError> {
/// let registry = Arc::new(PluginRegistry::new());
/// let server = TaplineServer::builder()
///     .bind("127.0.0.1:8787")
///     .upstream("ws://game.example:9000")
///     .registry(registry)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TaplineServerBuilder {
    bind_addr: String,
    upstream: String,
    registry: Option<Arc<PluginRegistry>>,
}

impl TaplineServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(&ProxyConfig::default())
    }

    /// Creates a builder from a loaded configuration.
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            bind_addr: config.bind.clone(),
            upstream: config.upstream.clone(),
            registry: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the WebSocket URL of the game server.
    pub fn upstream(mut self, url: &str) -> Self {
        self.upstream = url.to_string();
        self
    }

    /// Sets the registry whose plugins see the traffic. Without one the
    /// server starts with an empty registry.
    pub fn registry(mut self, registry: Arc<PluginRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Binds the listener.
    pub async fn build(self) -> Result<TaplineServer, TaplineError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            upstream: self.upstream,
            registry: self.registry.unwrap_or_default(),
        });

        Ok(TaplineServer { transport, state })
    }
}

impl Default for TaplineServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tapline server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TaplineServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TaplineServer {
    /// Creates a new builder.
    pub fn builder() -> TaplineServerBuilder {
        TaplineServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The registry shared by every connection.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.state.registry
    }

    /// Runs the accept loop.
    ///
    /// Every accepted client gets its own task that dials the upstream
    /// server and relays both directions. Runs until the process is
    /// terminated; a failing connection never stops the loop.
    pub async fn run(mut self) -> Result<(), TaplineError> {
        tracing::info!(upstream = %self.state.upstream, "Tapline server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
