//! Per-line context handed to handlers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which way a line travels through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Server to client.
    Incoming,
    /// Client to server.
    Outgoing,
}

impl Direction {
    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Incoming => 0,
            Direction::Outgoing => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// Provenance of a line. `source_id` and `tag` are opaque to the registry;
/// a plugin that originates traffic sets them so that it can recognise
/// (and usually skip) its own lines later in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    pub direction: Direction,
    pub source_id: Option<String>,
    pub tag: Option<String>,
}

impl MessageContext {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            source_id: None,
            tag: None,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Returns `true` if the line was originated by `source_id`.
    pub fn is_from(&self, source_id: &str) -> bool {
        self.source_id.as_deref() == Some(source_id)
    }
}
