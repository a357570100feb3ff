//! Errors raised below the line protocol.

use std::error::Error as StdError;

/// Underlying cause, kept opaque so the trait layer stays backend-neutral.
pub type TransportSource = Box<dyn StdError + Send + Sync>;

/// What went wrong on a socket.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not take its address.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting a client failed, including a failed handshake.
    #[error("accept failed: {0}")]
    Accept(#[source] TransportSource),

    /// The game server could not be reached.
    #[error("cannot reach upstream {url}: {source}")]
    Upstream {
        url: String,
        #[source]
        source: TransportSource,
    },

    #[error("write failed: {0}")]
    Write(#[source] TransportSource),

    #[error("read failed: {0}")]
    Read(#[source] TransportSource),
}
