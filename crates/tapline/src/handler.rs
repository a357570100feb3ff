//! Per-connection relay.
//!
//! Each accepted client gets its own Tokio task running this handler.
//! The flow is:
//!   1. Dial the upstream game server
//!   2. Tell plugins the session is up
//!   3. Loop: feed frames from either side into the interceptor
//!   4. Flush both queues, close both sockets, tell plugins it is over

use std::sync::Arc;

use tapline_plugin::PluginRegistry;
use tapline_proxy::Interceptor;
use tapline_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::server::ServerState;
use crate::TaplineError;

/// Drop guard that sends the disconnect notification when the handler
/// exits, including by panic.
struct DisconnectGuard {
    conn_id: ConnectionId,
    registry: Arc<PluginRegistry>,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        tracing::debug!(conn_id = %self.conn_id, "session over");
        self.registry.notify_disconnected();
    }
}

/// Handles a single client from accept to close.
pub(crate) async fn handle_connection(
    client: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TaplineError> {
    let conn_id = client.id();
    let client = Arc::new(client);
    tracing::debug!(%conn_id, "handling new connection");

    let upstream = match WebSocketConnection::connect(&state.upstream).await {
        Ok(conn) => Arc::new(conn),
        Err(e) => {
            tracing::warn!(%conn_id, upstream = %state.upstream, error = %e, "upstream unreachable");
            let _ = client.close().await;
            return Err(e.into());
        }
    };
    tracing::info!(%conn_id, upstream = %state.upstream, "relay established");

    state.registry.notify_connected();
    let _guard = DisconnectGuard {
        conn_id,
        registry: Arc::clone(&state.registry),
    };

    let proxy = Interceptor::new(
        Arc::clone(&state.registry),
        Arc::clone(&client),
        Arc::clone(&upstream),
    );
    let result = relay(conn_id, &proxy, &client, &upstream).await;

    if let Err(e) = proxy.flush().await {
        tracing::debug!(%conn_id, error = %e, "flush failed");
    }
    let _ = client.close().await;
    let _ = upstream.close().await;

    // _guard drops here → disconnect notification fires.
    result
}

/// Moves frames into the interceptor until either side closes.
async fn relay(
    conn_id: ConnectionId,
    proxy: &Interceptor,
    client: &WebSocketConnection,
    upstream: &WebSocketConnection,
) -> Result<(), TaplineError> {
    loop {
        tokio::select! {
            frame = client.recv() => match frame? {
                Some(frame) => {
                    tracing::trace!(%conn_id, kind = %frame.kind(), len = frame.len(), "client frame");
                    proxy.client_frame(frame).await?;
                }
                None => {
                    tracing::info!(%conn_id, "client closed the connection");
                    return Ok(());
                }
            },
            frame = upstream.recv() => match frame? {
                Some(frame) => {
                    tracing::trace!(%conn_id, kind = %frame.kind(), len = frame.len(), "server frame");
                    proxy.server_frame(frame).await?;
                }
                None => {
                    tracing::info!(%conn_id, "server closed the connection");
                    return Ok(());
                }
            },
        }
    }
}
