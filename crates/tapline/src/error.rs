//! Unified error type for Tapline.

use tapline_plugin::PluginError;
use tapline_protocol::ProtocolError;
use tapline_proxy::ProxyError;
use tapline_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TaplineError {
    /// A transport-level error (bind, dial, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A codec error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A plugin registration error.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// An interception queue error.
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// A configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
