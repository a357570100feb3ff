//! What a plugin sets up during init, and how the registry stores it.

use std::any::Any;
use std::sync::Arc;

use crate::lifecycle::Hook;
use crate::{Direction, Handler, LifecycleEvent, MessageContext, PluginId, PluginMetadata, ServiceDirectory};

/// A read-only listener for lines that made it through the whole chain.
pub(crate) type Observer = Arc<dyn Fn(&str, &MessageContext) + Send + Sync>;

/// A transform handler together with its place in the chain.
#[derive(Clone)]
pub(crate) struct Transform {
    pub direction: Direction,
    pub priority: i32,
    pub handler: Arc<dyn Handler>,
}

pub(crate) struct StagedService {
    pub name: String,
    pub version: String,
    pub object: Arc<dyn Any + Send + Sync>,
}

/// Handed to a plugin's init callback. Everything registered here takes
/// effect only if init returns `Ok`.
pub struct PluginContext {
    id: PluginId,
    directory: ServiceDirectory,
    pub(crate) transforms: Vec<Transform>,
    pub(crate) observers: Vec<(Direction, Observer)>,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) services: Vec<StagedService>,
}

impl PluginContext {
    pub(crate) fn new(id: PluginId, directory: ServiceDirectory) -> Self {
        Self {
            id,
            directory,
            transforms: Vec::new(),
            observers: Vec::new(),
            hooks: Vec::new(),
            services: Vec::new(),
        }
    }

    /// The id of the plugin being initialised.
    pub fn id(&self) -> &PluginId {
        &self.id
    }

    /// Adds a transform for server → client lines. Higher priorities run
    /// first.
    pub fn on_incoming(&mut self, priority: i32, handler: impl Handler + 'static) -> &mut Self {
        self.transform(Direction::Incoming, priority, handler)
    }

    /// Adds a transform for client → server lines.
    pub fn on_outgoing(&mut self, priority: i32, handler: impl Handler + 'static) -> &mut Self {
        self.transform(Direction::Outgoing, priority, handler)
    }

    pub fn observe_incoming(
        &mut self,
        observer: impl Fn(&str, &MessageContext) + Send + Sync + 'static,
    ) -> &mut Self {
        self.observers.push((Direction::Incoming, Arc::new(observer)));
        self
    }

    pub fn observe_outgoing(
        &mut self,
        observer: impl Fn(&str, &MessageContext) + Send + Sync + 'static,
    ) -> &mut Self {
        self.observers.push((Direction::Outgoing, Arc::new(observer)));
        self
    }

    /// Adds a lifecycle hook. Hooks see every [`LifecycleEvent`] addressed to
    /// this plugin and pick the ones they care about.
    pub fn on(&mut self, hook: impl Fn(&LifecycleEvent) + Send + Sync + 'static) -> &mut Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Publishes a service once init succeeds.
    pub fn provide_service<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        service: Arc<T>,
    ) -> &mut Self {
        self.services.push(StagedService {
            name: name.into(),
            version: version.into(),
            object: service,
        });
        self
    }

    /// Services published by plugins registered earlier.
    pub fn services(&self) -> &ServiceDirectory {
        &self.directory
    }

    fn transform(
        &mut self,
        direction: Direction,
        priority: i32,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.transforms.push(Transform {
            direction,
            priority,
            handler: Arc::new(handler),
        });
        self
    }
}

/// A registered plugin.
pub(crate) struct PluginEntry {
    pub metadata: PluginMetadata,
    pub enabled: bool,
    pub transforms: Vec<Transform>,
    pub observers: Vec<(Direction, Observer)>,
    pub hooks: Vec<Hook>,
}

impl PluginEntry {
    pub(crate) fn from_context(metadata: PluginMetadata, ctx: PluginContext) -> Self {
        Self {
            enabled: !metadata.disabled_by_default,
            metadata,
            transforms: ctx.transforms,
            observers: ctx.observers,
            hooks: ctx.hooks,
        }
    }

    pub(crate) fn id(&self) -> &PluginId {
        &self.metadata.id
    }
}
