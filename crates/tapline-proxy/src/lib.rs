//! Connection interception for Tapline.
//!
//! ```text
//! payload ──→ LineFramer ──→ line ──→ PluginRegistry::process ──→ survivors
//!                                                                    │
//!                   one payload, same representation as the input ←──┘
//! ```
//!
//! Each direction of a connection gets its own queue actor
//! ([`spawn_queue`]). The actor works through its units strictly one
//! after another, so lines leave in the order they arrived even when a
//! handler awaits. [`Interceptor`] bundles the two queues of one
//! connection and adds the programmatic `send`/`inject` entry points.

mod error;
mod framer;
mod interceptor;
mod queue;
mod sink;

pub use error::ProxyError;
pub use framer::LineFramer;
pub use interceptor::Interceptor;
pub use queue::{Origin, QueueHandle, spawn_queue};
pub use sink::FrameSink;
