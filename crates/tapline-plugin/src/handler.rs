//! The transform handler trait.

use std::future::Future;

use async_trait::async_trait;

use crate::{HandlerError, MessageContext};

/// What a handler returns: `Ok(Some(line))` to pass `line` on,
/// `Ok(None)` to drop the line, `Err(_)` to leave it untouched.
pub type HandlerResult = Result<Option<String>, HandlerError>;

/// One step of a pipeline.
///
/// Handlers may await external work; the queue that feeds them waits for
/// each call to finish before starting the next, so lines never overtake
/// each other.
///
/// Any `Fn(String, MessageContext) -> impl Future<Output = HandlerResult>`
/// closure is a handler:
///
/// ```
/// use tapline_plugin::{HandlerError, MessageContext, PluginContext};
///
/// fn init(ctx: &mut PluginContext) -> Result<(), HandlerError> {
///     ctx.on_incoming(0, |line: String, _ctx: MessageContext| async move {
///         Ok::<_, HandlerError>(Some(line.to_uppercase()))
///     });
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, line: String, ctx: &MessageContext) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(String, MessageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, line: String, ctx: &MessageContext) -> HandlerResult {
        (self)(line, ctx.clone()).await
    }
}
