// src/handlers/javascript.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::{run_transform, with_default};
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

/// Source-map directory, relative to `dest`.
pub const DEFAULT_MAPS_DIR: &str = "maps";

/// Bundles the `entry` scripts.
///
/// Bundlers write intermediate files into `dest` and are not safe to run
/// twice at once for the same output, so this handler is serialized: the
/// dispatcher queues overlapping triggers per descriptor.
///
/// Params:
/// - `maps_dir` (default `maps`): source-map directory, only used in
///   development builds.
/// - `use_fallback` (default `true`): also emit a legacy-syntax bundle.
pub struct JavascriptHandler {
    transformer: Arc<dyn Transformer>,
}

impl JavascriptHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for JavascriptHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            let entry = descriptor.require_entry()?;
            let dest = descriptor.require_dest()?;

            let mut params = descriptor.params().clone();
            with_default(&mut params, "use_fallback", true);
            with_default(&mut params, "minify", ctx.env.minify());
            with_default(&mut params, "source_maps", ctx.env.source_maps());
            if ctx.env.source_maps() {
                with_default(&mut params, "maps_dir", DEFAULT_MAPS_DIR);
            }
            if let Some(targets) = ctx.env.browserslist() {
                with_default(&mut params, "browserslist", targets);
            }

            run_transform(self.transformer.as_ref(), ctx, descriptor, entry, dest, params).await
        })
    }

    fn serialized(&self) -> bool {
        true
    }
}
