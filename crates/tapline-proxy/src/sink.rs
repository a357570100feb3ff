//! Where a queue delivers the frames it produces.

use std::future::Future;
use std::sync::Arc;

use tapline_transport::{Connection, Frame};
use tokio::sync::mpsc;

use crate::ProxyError;

/// Receives the frames a queue writes, one physical write per call.
pub trait FrameSink: Send + Sync + 'static {
    fn deliver(&self, frame: Frame) -> impl Future<Output = Result<(), ProxyError>> + Send;
}

impl<C: Connection> FrameSink for Arc<C> {
    async fn deliver(&self, frame: Frame) -> Result<(), ProxyError> {
        self.send(frame)
            .await
            .map_err(|e| ProxyError::Transport(Box::new(e)))
    }
}

/// Forwards frames into a channel. Used by tests and by embedders that
/// drive the socket themselves.
impl FrameSink for mpsc::UnboundedSender<Frame> {
    async fn deliver(&self, frame: Frame) -> Result<(), ProxyError> {
        self.send(frame).map_err(|_| ProxyError::SinkClosed)
    }
}
