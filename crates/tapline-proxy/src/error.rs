//! Error types for the interception layer.

use tapline_plugin::Direction;

/// Errors that can occur while intercepting a connection.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The queue task for this direction has stopped.
    #[error("{0} queue is closed")]
    QueueClosed(Direction),

    /// `send`/`inject` append the newline themselves; the caller passed
    /// text that already ends in one.
    #[error("text already ends in a newline")]
    TrailingNewline,

    /// The channel a sink forwards into has been dropped.
    #[error("frame sink is closed")]
    SinkClosed,

    /// Writing to the underlying connection failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Text queued as whole lines did not end in a newline.
    #[error("queued text does not end in a newline")]
    UnterminatedText,
}
