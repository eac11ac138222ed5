// src/handlers/img.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::run_transform;
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

/// Optimises images. Inputs default to the watched set.
pub struct ImgHandler {
    transformer: Arc<dyn Transformer>,
}

impl ImgHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for ImgHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            descriptor.require_watch_on()?;
            let inputs = descriptor.entry_or_watch_on()?;
            let dest = descriptor.require_dest()?;

            let params = descriptor.params().clone();
            run_transform(self.transformer.as_ref(), ctx, descriptor, inputs, dest, params).await
        })
    }
}
