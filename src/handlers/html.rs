// src/handlers/html.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::run_transform;
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

/// Expands HTML includes for the `entry` pages.
///
/// The optional `root` param (already resolved) is the include search path.
pub struct HtmlHandler {
    transformer: Arc<dyn Transformer>,
}

impl HtmlHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for HtmlHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            let entry = descriptor.require_entry()?;
            let dest = descriptor.require_dest()?;

            let params = descriptor.params().clone();
            run_transform(self.transformer.as_ref(), ctx, descriptor, entry, dest, params).await
        })
    }
}
