// src/engine/live.rs

//! Glue between the watcher and the dispatcher for `watch` mode.

use std::sync::Arc;

use tracing::debug;

use crate::config::TaskDescriptor;
use crate::devserver::{AssetChange, DevServer};
use crate::engine::dispatcher::Dispatcher;
use crate::paths::resolve_path;
use crate::types::DescriptorId;
use crate::watch::OnTrigger;

/// Build the default `on_trigger` callback.
///
/// Each trigger dispatches one invocation; once it succeeds the dev-server
/// hears about the change. Failures were already reported by the dispatcher
/// and are otherwise ignored here.
pub fn live_trigger(dispatcher: Arc<Dispatcher>, devserver: Arc<dyn DevServer>) -> OnTrigger {
    Arc::new(move |id: DescriptorId, descriptor: TaskDescriptor| {
        let ticket = dispatcher.dispatch(id.clone(), &descriptor);
        let dest = descriptor
            .dest
            .as_deref()
            .map(|d| resolve_path(d, dispatcher.context().env.root()));
        let devserver = Arc::clone(&devserver);

        tokio::spawn(async move {
            let Some(outcome) = ticket.wait().await else {
                debug!(task = %id.task, index = id.index, "rebuild failed; dev-server not notified");
                return;
            };
            devserver.notify(&AssetChange {
                task: id.task,
                dest,
                written: outcome.written,
            });
        });
    })
}
