// src/handlers/reload.rs

use tracing::debug;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::types::BoxFuture;

/// Produces nothing; its only effect is the dev-server reload that follows
/// every successful invocation in watch mode.
#[derive(Debug, Clone, Default)]
pub struct ReloadHandler;

impl TaskHandler for ReloadHandler {
    fn handle<'a>(
        &'a self,
        _ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            descriptor.require_watch_on()?;
            debug!(task = %descriptor.name(), "reload-only task");
            Ok(HandlerOutcome::default())
        })
    }
}
