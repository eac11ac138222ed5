// src/engine/dispatcher.rs

//! Routes one descriptor to its handler.
//!
//! The dispatcher is the handler boundary: it resolves the descriptor against
//! the project root, looks up the handler, runs it (through the descriptor's
//! serialized queue when the handler asks for that) and reports every
//! failure to the [`ErrorSink`]. Nothing escapes to the caller except a
//! ticket that says how it went.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::TaskDescriptor;
use crate::engine::serial::{run_isolated, QueueJob, SerialQueue};
use crate::errors::{BuildError, Result};
use crate::registry::{HandlerOutcome, TaskContext, TaskRegistry};
use crate::report::ErrorSink;
use crate::types::{BoxFuture, DescriptorId, TaskOutcome};

/// Pending result of one dispatch.
#[derive(Debug)]
pub struct DispatchTicket {
    id: DescriptorId,
    rx: oneshot::Receiver<Option<HandlerOutcome>>,
}

impl DispatchTicket {
    pub fn id(&self) -> &DescriptorId {
        &self.id
    }

    /// Wait for the invocation to settle. `None` means it failed (the error
    /// has already been reported).
    pub async fn wait(self) -> Option<HandlerOutcome> {
        self.rx.await.ok().flatten()
    }

    pub async fn outcome(self) -> TaskOutcome {
        match self.wait().await {
            Some(_) => TaskOutcome::Success,
            None => TaskOutcome::Failed,
        }
    }
}

pub struct Dispatcher {
    registry: TaskRegistry,
    ctx: TaskContext,
    errors: Arc<dyn ErrorSink>,
    /// One queue per descriptor identity, created on first use.
    queues: Mutex<HashMap<DescriptorId, Arc<SerialQueue>>>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("queues", &self.queue_count())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(registry: TaskRegistry, ctx: TaskContext, errors: Arc<dyn ErrorSink>) -> Self {
        Self {
            registry,
            ctx,
            errors,
            queues: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Number of serialized queues created so far.
    pub fn queue_count(&self) -> usize {
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// The serialized queue for `id`, if one has been created.
    pub fn queue(&self, id: &DescriptorId) -> Option<Arc<SerialQueue>> {
        self.queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    fn queue_for(&self, id: &DescriptorId) -> Arc<SerialQueue> {
        let mut queues = self.queues.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            queues
                .entry(id.clone())
                .or_insert_with(|| Arc::new(SerialQueue::new(id.to_string()))),
        )
    }

    /// Start one handler invocation for `descriptor`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, id: DescriptorId, descriptor: &TaskDescriptor) -> DispatchTicket {
        let (tx, rx) = oneshot::channel();
        let ticket = DispatchTicket { id: id.clone(), rx };

        let Some(handler) = self.registry.get(&id.task) else {
            self.finish(&id, Err(BuildError::UnknownTask(id.task.clone())), tx);
            return ticket;
        };

        let resolved = descriptor.resolve(self.ctx.env.root());
        let ctx = self.ctx.clone();
        let serialized = handler.serialized();
        let job: QueueJob = Box::new(move || -> BoxFuture<'static, Result<HandlerOutcome>> {
            Box::pin(async move { handler.handle(&ctx, &resolved).await })
        });

        let errors = Arc::clone(&self.errors);
        if serialized {
            let queue = self.queue_for(&id);
            debug!(task = %id.task, index = id.index, pending = queue.pending(), "enqueueing serialized invocation");
            let reply = queue.enqueue(job);
            tokio::spawn(async move {
                let result = reply.await.unwrap_or_else(|_| {
                    Err(BuildError::QueueTask {
                        task: id.task.clone(),
                        reason: "queue dropped the invocation".to_string(),
                    })
                });
                settle(errors.as_ref(), &id, result, tx);
            });
        } else {
            debug!(task = %id.task, index = id.index, "dispatching invocation");
            tokio::spawn(async move {
                let result = match run_isolated(job).await {
                    Ok(result) => result,
                    Err(join_err) => Err(BuildError::transform(
                        id.task.clone(),
                        anyhow::anyhow!("handler panicked: {join_err}"),
                    )),
                };
                settle(errors.as_ref(), &id, result, tx);
            });
        }

        ticket
    }

    fn finish(
        &self,
        id: &DescriptorId,
        result: Result<HandlerOutcome>,
        tx: oneshot::Sender<Option<HandlerOutcome>>,
    ) {
        settle(self.errors.as_ref(), id, result, tx);
    }
}

fn settle(
    errors: &dyn ErrorSink,
    id: &DescriptorId,
    result: Result<HandlerOutcome>,
    tx: oneshot::Sender<Option<HandlerOutcome>>,
) {
    let outcome = match result {
        Ok(outcome) => {
            debug!(task = %id.task, index = id.index, written = outcome.written.len(), "task finished");
            Some(outcome)
        }
        Err(err) => {
            errors.report(id, &err);
            None
        }
    };
    if tx.send(outcome).is_err() {
        warn!(task = %id.task, index = id.index, "dispatch ticket dropped before completion");
    }
}
