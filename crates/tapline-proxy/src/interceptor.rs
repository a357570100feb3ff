//! The two queues of one intercepted connection.

use std::sync::Arc;

use tapline_plugin::{Direction, PluginRegistry};
use tapline_transport::Frame;

use crate::{FrameSink, Origin, ProxyError, QueueHandle, spawn_queue};

/// Sits between one client and its upstream server.
///
/// Frames the client sends are fed to the outgoing queue, frames the
/// server sends to the incoming queue. Each queue writes its survivors to
/// the opposite side. The two directions are independent: nothing orders
/// an incoming line against an outgoing one.
#[derive(Debug)]
pub struct Interceptor {
    registry: Arc<PluginRegistry>,
    incoming: QueueHandle,
    outgoing: QueueHandle,
}

impl Interceptor {
    /// Spawns both queues. `to_client` receives incoming output,
    /// `to_server` outgoing output.
    pub fn new<C, S>(registry: Arc<PluginRegistry>, to_client: C, to_server: S) -> Self
    where
        C: FrameSink,
        S: FrameSink,
    {
        let incoming = spawn_queue(Direction::Incoming, Arc::clone(&registry), to_client);
        let outgoing = spawn_queue(Direction::Outgoing, Arc::clone(&registry), to_server);
        Self {
            registry,
            incoming,
            outgoing,
        }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// A payload the client sent.
    pub async fn client_frame(&self, frame: Frame) -> Result<(), ProxyError> {
        self.outgoing.push_frame(frame).await
    }

    /// A payload the server sent.
    pub async fn server_frame(&self, frame: Frame) -> Result<(), ProxyError> {
        self.incoming.push_frame(frame).await
    }

    /// Sends `text` to the server as if the client had written it, through
    /// the outgoing chain. One newline is appended; `text` may hold several
    /// lines but must not end in a newline itself.
    pub async fn send(&self, text: &str, origin: Origin) -> Result<(), ProxyError> {
        push_lines(&self.outgoing, text, origin, false).await
    }

    /// Delivers `text` to the client as if the server had written it,
    /// through the incoming chain. Same newline contract as [`send`](Self::send).
    pub async fn inject(&self, text: &str, origin: Origin) -> Result<(), ProxyError> {
        push_lines(&self.incoming, text, origin, false).await
    }

    /// Like [`send`](Self::send) but skips the handler chain.
    pub async fn send_raw(&self, text: &str) -> Result<(), ProxyError> {
        push_lines(&self.outgoing, text, Origin::default(), true).await
    }

    /// Like [`inject`](Self::inject) but skips the handler chain.
    pub async fn inject_raw(&self, text: &str) -> Result<(), ProxyError> {
        push_lines(&self.incoming, text, Origin::default(), true).await
    }

    /// Waits until both queues have written everything queued so far.
    pub async fn flush(&self) -> Result<(), ProxyError> {
        self.incoming.flush().await?;
        self.outgoing.flush().await
    }
}

async fn push_lines(
    queue: &QueueHandle,
    text: &str,
    origin: Origin,
    bypass: bool,
) -> Result<(), ProxyError> {
    if text.ends_with('\n') {
        return Err(ProxyError::TrailingNewline);
    }
    let mut line = String::with_capacity(text.len() + 1);
    line.push_str(text);
    line.push('\n');
    queue.push_text(line, origin, bypass).await
}
