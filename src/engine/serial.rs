// src/engine/serial.rs

//! Async executor around [`QueueCore`].
//!
//! At most one job per queue is in flight. Jobs arriving meanwhile wait in
//! FIFO order; when the running job settles (success, error or panic) the
//! next one starts after yielding once to the scheduler.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::engine::queue::{QueueCore, QueueState};
use crate::errors::{BuildError, Result};
use crate::registry::HandlerOutcome;
use crate::types::BoxFuture;

/// Deferred invocation; nothing runs until the queue calls it.
pub type QueueJob = Box<dyn FnOnce() -> BoxFuture<'static, Result<HandlerOutcome>> + Send>;

struct Request {
    job: QueueJob,
    reply: oneshot::Sender<Result<HandlerOutcome>>,
}

pub struct SerialQueue {
    name: String,
    core: Arc<Mutex<QueueCore<Request>>>,
}

impl fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialQueue")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

impl SerialQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            core: Arc::new(Mutex::new(QueueCore::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> QueueState {
        lock(&self.core).state()
    }

    pub fn pending(&self) -> usize {
        lock(&self.core).pending()
    }

    /// Append a job. The returned receiver yields the job's result once it
    /// has run.
    pub fn enqueue(&self, job: QueueJob) -> oneshot::Receiver<Result<HandlerOutcome>> {
        let (reply, rx) = oneshot::channel();
        let start = lock(&self.core).enqueue(Request { job, reply });

        if let Some(first) = start {
            debug!(queue = %self.name, "queue idle; starting executor loop");
            tokio::spawn(drain(self.name.clone(), Arc::clone(&self.core), first));
        }
        rx
    }
}

/// Run `current`, then keep pulling from the core until it goes idle.
async fn drain(name: String, core: Arc<Mutex<QueueCore<Request>>>, first: Request) {
    let mut current = first;
    loop {
        let Request { job, reply } = current;

        let result = match run_isolated(job).await {
            Ok(result) => result,
            Err(join_err) => {
                warn!(queue = %name, error = %join_err, "queued invocation panicked");
                Err(BuildError::QueueTask {
                    task: name.clone(),
                    reason: join_err.to_string(),
                })
            }
        };
        if let Err(err) = &result {
            debug!(queue = %name, error = %err, "queued invocation failed; continuing");
        }
        if reply.send(result).is_err() {
            debug!(queue = %name, "result receiver dropped");
        }

        let next = lock(&core).settle();
        match next {
            Some(request) => {
                tokio::task::yield_now().await;
                current = request;
            }
            None => {
                debug!(queue = %name, "queue drained; idle");
                break;
            }
        }
    }
}

/// Run a job in its own task so a panic settles it instead of killing the
/// executor loop.
pub(crate) async fn run_isolated(job: QueueJob) -> std::result::Result<Result<HandlerOutcome>, JoinError> {
    tokio::spawn(async move { job().await }).await
}

fn lock<R>(core: &Mutex<QueueCore<R>>) -> MutexGuard<'_, QueueCore<R>> {
    core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
