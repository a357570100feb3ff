//! Building and running the per-direction handler chain.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures_util::FutureExt;

use crate::plugin::{Observer, PluginEntry};
use crate::{Direction, Handler, MessageContext, PluginId};

/// One flattened handler in a chain.
#[derive(Clone)]
pub(crate) struct PipelineEntry {
    pub plugin: PluginId,
    pub priority: i32,
    pub handler: Arc<dyn Handler>,
}

pub(crate) type Chain = Arc<[PipelineEntry]>;

/// Flattens the handlers of every enabled plugin for `direction` and orders
/// them by descending priority. The sort is stable, so equal priorities
/// keep plugin registration order, then the order a plugin added them.
pub(crate) fn build_chain(plugins: &[PluginEntry], direction: Direction) -> Chain {
    let mut chain: Vec<PipelineEntry> = plugins
        .iter()
        .filter(|p| p.enabled)
        .flat_map(|p| {
            p.transforms
                .iter()
                .filter(move |t| t.direction == direction)
                .map(move |t| PipelineEntry {
                    plugin: p.id().clone(),
                    priority: t.priority,
                    handler: Arc::clone(&t.handler),
                })
        })
        .collect();
    chain.sort_by(|a, b| b.priority.cmp(&a.priority));
    chain.into()
}

/// Runs `line` through `chain`.
///
/// Returns `None` as soon as a handler drops the line. A handler that
/// fails or panics is logged and skipped; the next handler sees the line
/// as it was before the failing one ran.
pub(crate) async fn dispatch(chain: &[PipelineEntry], line: String, ctx: &MessageContext) -> Option<String> {
    let mut current = line;
    for entry in chain {
        let outcome = AssertUnwindSafe(entry.handler.handle(current.clone(), ctx))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(Some(next))) => current = next,
            Ok(Ok(None)) => {
                tracing::trace!(
                    plugin = %entry.plugin,
                    direction = %ctx.direction,
                    line = %current,
                    "line dropped"
                );
                return None;
            }
            Ok(Err(error)) => {
                tracing::warn!(
                    plugin = %entry.plugin,
                    direction = %ctx.direction,
                    %error,
                    "handler failed"
                );
            }
            Err(_) => {
                tracing::warn!(
                    plugin = %entry.plugin,
                    direction = %ctx.direction,
                    "handler panicked"
                );
            }
        }
    }
    Some(current)
}

/// Observers of every enabled plugin for `direction`, in registration order.
pub(crate) fn observers(plugins: &[PluginEntry], direction: Direction) -> Vec<(PluginId, Observer)> {
    plugins
        .iter()
        .filter(|p| p.enabled)
        .flat_map(|p| {
            p.observers
                .iter()
                .filter(move |(d, _)| *d == direction)
                .map(move |(_, o)| (p.id().clone(), Arc::clone(o)))
        })
        .collect()
}

pub(crate) fn notify(observers: &[(PluginId, Observer)], line: &str, ctx: &MessageContext) {
    for (plugin, observer) in observers {
        if catch_unwind(AssertUnwindSafe(|| observer(line, ctx))).is_err() {
            tracing::warn!(%plugin, direction = %ctx.direction, "observer panicked");
        }
    }
}
