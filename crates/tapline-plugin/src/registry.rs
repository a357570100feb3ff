//! The plugin registry: owns every plugin of a session and dispatches
//! lines through their handlers.

use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::lifecycle::{self, Hook};
use crate::pipeline::{self, Chain};
use crate::plugin::{PluginEntry, Transform};
use crate::{
    Direction, Handler, HandlerError, LifecycleEvent, MessageContext, PluginContext, PluginError,
    PluginId, PluginInfo, PluginMetadata, ServiceDirectory,
};

/// Capacity of the registry event channel. Slow subscribers lag rather
/// than block registration.
const EVENT_CAPACITY: usize = 64;

/// A change to the set of plugins, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Registered(PluginId),
    Unregistered(PluginId),
    Enabled(PluginId),
    Disabled(PluginId),
}

#[derive(Default)]
struct Inner {
    /// Registration order.
    plugins: Vec<PluginEntry>,
    /// Built chains per direction, `None` once invalidated.
    chains: [Option<Chain>; 2],
}

impl Inner {
    fn position(&self, id: &PluginId) -> Option<usize> {
        self.plugins.iter().position(|p| p.id() == id)
    }

    fn get_mut(&mut self, id: &PluginId) -> Result<&mut PluginEntry, PluginError> {
        self.plugins
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| PluginError::NotFound(id.clone()))
    }

    fn hooks(&self, id: &PluginId) -> Result<Vec<Hook>, PluginError> {
        self.plugins
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.hooks.clone())
            .ok_or_else(|| PluginError::NotFound(id.clone()))
    }

    fn invalidate(&mut self) {
        self.chains = [None, None];
    }
}

/// Owns the plugins of one proxy session.
///
/// Construct it once and share it behind an `Arc`. Registration and
/// enable/disable take a short lock; dispatch clones the cached chain and
/// runs the handlers without holding it, so a slow handler never blocks
/// registration and a line already in flight finishes with the chain it
/// started with.
pub struct PluginRegistry {
    inner: Mutex<Inner>,
    services: ServiceDirectory,
    events: broadcast::Sender<RegistryEvent>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Mutex::new(Inner::default()),
            services: ServiceDirectory::new(),
            events,
        }
    }

    /// Registers a plugin and runs its `init` callback.
    ///
    /// The plugin starts enabled unless its metadata says otherwise, and
    /// receives [`LifecycleEvent::Load`] once it is in place.
    ///
    /// # Errors
    /// - [`PluginError::MissingId`], [`PluginError::MissingName`],
    ///   [`PluginError::MissingVersion`] for incomplete metadata
    /// - [`PluginError::Duplicate`] if the id is taken
    /// - [`PluginError::Init`] if `init` fails or panics; nothing it set up
    ///   is kept
    pub fn register_plugin<F>(&self, metadata: PluginMetadata, init: F) -> Result<(), PluginError>
    where
        F: FnOnce(&mut PluginContext) -> Result<(), HandlerError>,
    {
        if let Err(error) = validate(&metadata) {
            tracing::warn!(plugin = %metadata.id, %error, "plugin rejected");
            return Err(error);
        }
        let id = metadata.id.clone();
        if self.inner.lock().position(&id).is_some() {
            tracing::warn!(plugin = %id, "plugin rejected, id already registered");
            return Err(PluginError::Duplicate(id));
        }

        let mut ctx = PluginContext::new(id.clone(), self.services.clone());
        let outcome = match catch_unwind(AssertUnwindSafe(|| init(&mut ctx))) {
            Ok(result) => result,
            Err(_) => Err("init panicked".into()),
        };
        if let Err(source) = outcome {
            tracing::warn!(plugin = %id, error = %source, "plugin init failed");
            return Err(PluginError::Init { id, source });
        }

        let services = std::mem::take(&mut ctx.services);
        let entry = PluginEntry::from_context(metadata, ctx);
        let enabled = entry.enabled;
        let hooks = entry.hooks.clone();
        {
            let mut inner = self.inner.lock();
            // init ran unlocked, so the id may have been taken meanwhile.
            if inner.position(&id).is_some() {
                return Err(PluginError::Duplicate(id));
            }
            inner.plugins.push(entry);
            inner.invalidate();
        }
        for service in services {
            self.services
                .insert(id.clone(), service.name, service.version, service.object);
        }

        tracing::info!(plugin = %id, enabled, "plugin registered");
        lifecycle::fire(&id, &hooks, &LifecycleEvent::Load);
        let _ = self.events.send(RegistryEvent::Registered(id));
        Ok(())
    }

    /// Removes a plugin. Its hooks receive [`LifecycleEvent::Unload`] while
    /// it is still registered; it then leaves the chains and the services it
    /// still provides are withdrawn.
    pub fn unregister_plugin(&self, id: &PluginId) -> Result<PluginMetadata, PluginError> {
        let hooks = self.inner.lock().hooks(id)?;
        lifecycle::fire(id, &hooks, &LifecycleEvent::Unload);

        let entry = {
            let mut inner = self.inner.lock();
            // An Unload hook may have removed the plugin itself.
            let index = inner
                .position(id)
                .ok_or_else(|| PluginError::NotFound(id.clone()))?;
            let entry = inner.plugins.remove(index);
            inner.invalidate();
            entry
        };
        self.services.withdraw(id);

        tracing::info!(plugin = %id, "plugin unregistered");
        let _ = self.events.send(RegistryEvent::Unregistered(id.clone()));
        Ok(entry.metadata)
    }

    /// Enables a plugin. Enabling an enabled plugin does nothing.
    pub fn enable(&self, id: &PluginId) -> Result<(), PluginError> {
        self.set_enabled(id, true)
    }

    /// Disables a plugin. Lines already being dispatched still reach its
    /// handlers; later lines do not.
    pub fn disable(&self, id: &PluginId) -> Result<(), PluginError> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &PluginId, enabled: bool) -> Result<(), PluginError> {
        let hooks = {
            let mut inner = self.inner.lock();
            let entry = inner.get_mut(id)?;
            if entry.enabled == enabled {
                return Ok(());
            }
            entry.enabled = enabled;
            let hooks = entry.hooks.clone();
            inner.invalidate();
            hooks
        };

        tracing::info!(plugin = %id, enabled, "plugin toggled");
        lifecycle::fire(id, &hooks, &LifecycleEvent::Pause { paused: !enabled });
        let event = if enabled {
            RegistryEvent::Enabled(id.clone())
        } else {
            RegistryEvent::Disabled(id.clone())
        };
        let _ = self.events.send(event);
        Ok(())
    }

    /// Returns `false` for disabled and for unknown plugins.
    pub fn is_enabled(&self, id: &PluginId) -> bool {
        self.inner
            .lock()
            .plugins
            .iter()
            .any(|p| p.id() == id && p.enabled)
    }

    /// Every registered plugin, in registration order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.inner
            .lock()
            .plugins
            .iter()
            .map(|p| PluginInfo {
                metadata: p.metadata.clone(),
                enabled: p.enabled,
            })
            .collect()
    }

    /// Adds a transform to an already registered plugin. The next line
    /// dispatched in `direction` sees it.
    pub fn add_handler(
        &self,
        id: &PluginId,
        direction: Direction,
        priority: i32,
        handler: impl Handler + 'static,
    ) -> Result<(), PluginError> {
        let mut inner = self.inner.lock();
        inner.get_mut(id)?.transforms.push(Transform {
            direction,
            priority,
            handler: std::sync::Arc::new(handler),
        });
        inner.invalidate();
        tracing::debug!(plugin = %id, %direction, priority, "handler added");
        Ok(())
    }

    /// Sends [`LifecycleEvent::Configure`] to one plugin.
    pub fn configure(&self, id: &PluginId) -> Result<(), PluginError> {
        let hooks = self.inner.lock().hooks(id)?;
        lifecycle::fire(id, &hooks, &LifecycleEvent::Configure);
        Ok(())
    }

    pub fn notify_connected(&self) {
        tracing::debug!("session connected");
        self.broadcast(&LifecycleEvent::Connect);
    }

    pub fn notify_disconnected(&self) {
        tracing::debug!("session disconnected");
        self.broadcast(&LifecycleEvent::Disconnect);
    }

    pub fn notify_logged_in(&self, name: &str, uid: u64) {
        tracing::info!(name, uid, "player logged in");
        self.broadcast(&LifecycleEvent::Login {
            name: name.to_owned(),
            uid,
        });
    }

    /// Runs `line` through the enabled handlers for `ctx.direction`.
    /// Returns `None` if a handler dropped it.
    pub async fn process(&self, line: String, ctx: &MessageContext) -> Option<String> {
        let chain = self.chain(ctx.direction);
        pipeline::dispatch(&chain, line, ctx).await
    }

    /// Shows a line that survived [`process`](Self::process) to the enabled
    /// observers for `ctx.direction`.
    pub fn observe(&self, line: &str, ctx: &MessageContext) {
        let observers = pipeline::observers(&self.inner.lock().plugins, ctx.direction);
        pipeline::notify(&observers, line, ctx);
    }

    /// Subscribes to registration changes.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Services published by registered plugins.
    pub fn services(&self) -> &ServiceDirectory {
        &self.services
    }

    /// The cached chain for `direction`, rebuilt if it was invalidated.
    fn chain(&self, direction: Direction) -> Chain {
        let mut inner = self.inner.lock();
        let slot = direction.index();
        if let Some(chain) = &inner.chains[slot] {
            return chain.clone();
        }
        let chain = pipeline::build_chain(&inner.plugins, direction);
        tracing::trace!(%direction, handlers = chain.len(), "handler chain rebuilt");
        inner.chains[slot] = Some(chain.clone());
        chain
    }

    /// Fires `event` on every enabled plugin.
    fn broadcast(&self, event: &LifecycleEvent) {
        let targets: Vec<(PluginId, Vec<Hook>)> = self
            .inner
            .lock()
            .plugins
            .iter()
            .filter(|p| p.enabled)
            .map(|p| (p.id().clone(), p.hooks.clone()))
            .collect();
        for (id, hooks) in &targets {
            lifecycle::fire(id, hooks, event);
        }
    }

    #[cfg(test)]
    fn has_cached_chain(&self, direction: Direction) -> bool {
        self.inner.lock().chains[direction.index()].is_some()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.inner.lock().plugins.len())
            .field("services", &self.services)
            .finish()
    }
}

fn validate(metadata: &PluginMetadata) -> Result<(), PluginError> {
    if metadata.id.is_empty() {
        return Err(PluginError::MissingId);
    }
    if metadata.name.trim().is_empty() {
        return Err(PluginError::MissingName(metadata.id.clone()));
    }
    if metadata.version.trim().is_empty() {
        return Err(PluginError::MissingVersion(metadata.id.clone()));
    }
    Ok(())
}
