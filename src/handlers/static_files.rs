// src/handlers/static_files.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::run_transform;
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

pub struct StaticHandler {
    transformer: Arc<dyn Transformer>,
}

impl StaticHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for StaticHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            let inputs = descriptor.require_watch_on()?;
            let dest = descriptor.require_dest()?;

            let params = descriptor.params().clone();
            run_transform(self.transformer.as_ref(), ctx, descriptor, inputs, dest, params).await
        })
    }
}
