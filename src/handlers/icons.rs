// src/handlers/icons.rs

use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::errors::Result;
use crate::handlers::{run_transform, with_default};
use crate::registry::{HandlerOutcome, TaskContext, TaskHandler};
use crate::transform::Transformer;
use crate::types::BoxFuture;

pub const DEFAULT_FILE_NAME: &str = "icons.svg";
/// `%s` is replaced by the icon's file stem.
pub const DEFAULT_ICON_ID: &str = "icon-%s";

/// Packs SVG icons into one symbol sprite.
///
/// Usually declared as a fan-out list, one descriptor per sprite set.
pub struct IconsHandler {
    transformer: Arc<dyn Transformer>,
}

impl IconsHandler {
    pub fn new(transformer: Arc<dyn Transformer>) -> Self {
        Self { transformer }
    }
}

impl TaskHandler for IconsHandler {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            descriptor.require_watch_on()?;
            let inputs = descriptor.entry_or_watch_on()?;
            let dest = descriptor.require_dest()?;

            let mut params = descriptor.params().clone();
            with_default(&mut params, "file_name", DEFAULT_FILE_NAME);
            with_default(&mut params, "icon_id", DEFAULT_ICON_ID);

            run_transform(self.transformer.as_ref(), ctx, descriptor, inputs, dest, params).await
        })
    }
}
