//! Plugin identity and descriptive metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a plugin, chosen by its author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginId(String);

impl PluginId {
    /// Creates an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PluginId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the loader knows about a plugin before it runs.
///
/// `id`, `name` and `version` are required; registration rejects metadata
/// where any of them is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginMetadata {
    pub id: PluginId,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Where the plugin was loaded from (a URL or a path).
    pub source: Option<String>,
    /// Register the plugin in the disabled state.
    pub disabled_by_default: bool,
}

impl PluginMetadata {
    /// Creates metadata with the three required fields set.
    pub fn new(
        id: impl Into<PluginId>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.disabled_by_default = true;
        self
    }
}

/// A snapshot of one registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub metadata: PluginMetadata,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_json_fills_optional_fields() {
        let json = r#"{"id": "chat-log", "name": "Chat log", "version": "1.0.0"}"#;
        let meta: PluginMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta, PluginMetadata::new("chat-log", "Chat log", "1.0.0"));
        assert!(!meta.disabled_by_default);
    }

    #[test]
    fn test_blank_id_counts_as_empty() {
        assert!(PluginId::new("  ").is_empty());
        assert!(!PluginId::new("a").is_empty());
    }
}
