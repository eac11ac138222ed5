// src/handlers/css.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::{run_transform, with_default};
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

pub struct CssHandler {
    transformer: Arc<dyn Transformer>,
}

impl CssHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for CssHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            let entry = descriptor.require_entry()?;
            let dest = descriptor.require_dest()?;

            let mut params = descriptor.params().clone();
            with_default(&mut params, "minify", ctx.env.minify());
            with_default(&mut params, "source_maps", ctx.env.source_maps());
            if let Some(targets) = ctx.env.browserslist() {
                with_default(&mut params, "browserslist", targets);
            }

            run_transform(self.transformer.as_ref(), ctx, descriptor, entry, dest, params).await
        })
    }
}
