//! Named capabilities that plugins publish for each other.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::PluginId;

type ServiceObject = Arc<dyn Any + Send + Sync>;

struct ServiceEntry {
    version: String,
    provider: PluginId,
    object: ServiceObject,
}

/// Shared directory of services, keyed by name.
///
/// Cloning the directory clones a handle; every clone sees the same
/// entries. Registering a name that is already taken replaces the old
/// entry and logs a warning.
#[derive(Clone, Default)]
pub struct ServiceDirectory {
    entries: Arc<RwLock<HashMap<String, ServiceEntry>>>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `service` under `name` on behalf of `provider`.
    pub fn provide<T: Any + Send + Sync>(
        &self,
        provider: &PluginId,
        name: impl Into<String>,
        version: impl Into<String>,
        service: Arc<T>,
    ) {
        self.insert(provider.clone(), name.into(), version.into(), service);
    }

    pub(crate) fn insert(
        &self,
        provider: PluginId,
        name: String,
        version: String,
        object: ServiceObject,
    ) {
        let mut entries = self.entries.write();
        if let Some(old) = entries.get(&name) {
            tracing::warn!(
                service = %name,
                old_provider = %old.provider,
                new_provider = %provider,
                "service replaced"
            );
        }
        tracing::debug!(service = %name, %version, %provider, "service provided");
        entries.insert(
            name,
            ServiceEntry {
                version,
                provider,
                object,
            },
        );
    }

    /// Looks up a service by name. Returns `None` if the name is unknown or
    /// the service is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        let object = self.entries.read().get(name)?.object.clone();
        object.downcast::<T>().ok()
    }

    /// Returns the version string a service was published with.
    pub fn version(&self, name: &str) -> Option<String> {
        self.entries.read().get(name).map(|e| e.version.clone())
    }

    /// Returns the id of the plugin currently providing `name`.
    pub fn provider(&self, name: &str) -> Option<PluginId> {
        self.entries.read().get(name).map(|e| e.provider.clone())
    }

    /// All published service names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Removes every service still owned by `provider`.
    pub(crate) fn withdraw(&self, provider: &PluginId) {
        self.entries.write().retain(|_, e| &e.provider != provider);
    }
}

impl std::fmt::Debug for ServiceDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDirectory")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter(&'static str);

    #[test]
    fn test_get_downcasts_to_the_published_type() {
        let dir = ServiceDirectory::new();
        dir.provide(&"a".into(), "greeter", "1.0", Arc::new(Greeter("hi")));

        let greeter = dir.get::<Greeter>("greeter").unwrap();
        assert_eq!(greeter.0, "hi");
        assert!(dir.get::<String>("greeter").is_none());
        assert!(dir.get::<Greeter>("missing").is_none());
    }

    #[test]
    fn test_last_provider_wins() {
        let dir = ServiceDirectory::new();
        dir.provide(&"a".into(), "greeter", "1.0", Arc::new(Greeter("a")));
        dir.provide(&"b".into(), "greeter", "2.0", Arc::new(Greeter("b")));

        assert_eq!(dir.get::<Greeter>("greeter").unwrap().0, "b");
        assert_eq!(dir.version("greeter").as_deref(), Some("2.0"));
        assert_eq!(dir.provider("greeter"), Some(PluginId::from("b")));
    }

    #[test]
    fn test_withdraw_only_removes_own_services() {
        let dir = ServiceDirectory::new();
        dir.provide(&"a".into(), "one", "1", Arc::new(1u8));
        dir.provide(&"b".into(), "two", "1", Arc::new(2u8));
        dir.withdraw(&"a".into());
        assert_eq!(dir.names(), vec!["two".to_owned()]);
    }
}
