//! Test doubles for the handler, transformer and error-sink seams.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetline::config::ResolvedDescriptor;
use assetline::errors::{BuildError, Result};
use assetline::registry::{HandlerOutcome, TaskContext, TaskHandler};
use assetline::report::ErrorSink;
use assetline::transform::{TransformJob, TransformOutput, Transformer};
use assetline::types::{BoxFuture, DescriptorId};

/// One recorded handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub task: String,
    pub dest: Option<PathBuf>,
    /// Value of the `tag` param, if any. Lets tests tell fan-out entries
    /// and repeated triggers apart.
    pub tag: Option<String>,
}

/// What a [`RecordingHandler`] does on its N-th call (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

/// A handler that:
/// - records every invocation (at start) and every completion
/// - tracks how many invocations overlap
/// - optionally sleeps, fails or panics on selected calls.
#[derive(Clone)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Call>>>,
    finished: Arc<Mutex<Vec<Call>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    script: Arc<Mutex<Vec<Behaviour>>>,
    always_fail: bool,
    delay: Option<Duration>,
    serialized: bool,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(Vec::new())),
            always_fail: false,
            delay: None,
            serialized: false,
        }
    }

    pub fn serialized(mut self) -> Self {
        self.serialized = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Behaviour per call index; calls past the end succeed.
    pub fn with_script(self, script: Vec<Behaviour>) -> Self {
        *self.script.lock().unwrap() = script;
        self
    }

    /// Every call fails with a transform error.
    pub fn failing(mut self) -> Self {
        self.always_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Tags in the order invocations finished (successfully or not).
    pub fn finished_tags(&self) -> Vec<Option<String>> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.tag.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<dyn TaskHandler> {
        Arc::new(self)
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter and records completion even when the
/// invocation panics.
struct InFlightGuard {
    handler: RecordingHandler,
    call: Call,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.handler.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Ok(mut finished) = self.handler.finished.lock() {
            finished.push(self.call.clone());
        }
    }
}

impl TaskHandler for RecordingHandler {
    fn handle<'a>(
        &'a self,
        _ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>> {
        Box::pin(async move {
            let call = Call {
                task: descriptor.name().to_string(),
                dest: descriptor.dest().map(PathBuf::from),
                tag: descriptor.param_str("tag").map(str::to_string),
            };
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(call.clone());
                calls.len() - 1
            };
            let behaviour = self
                .script
                .lock()
                .unwrap()
                .get(index)
                .copied()
                .unwrap_or(if self.always_fail {
                    Behaviour::Fail
                } else {
                    Behaviour::Succeed
                });

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlightGuard {
                handler: self.clone(),
                call,
            };

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }

            match behaviour {
                Behaviour::Succeed => Ok(HandlerOutcome {
                    written: descriptor.dest().map(PathBuf::from).into_iter().collect(),
                }),
                Behaviour::Fail => Err(BuildError::transform(
                    descriptor.name(),
                    anyhow::anyhow!("scripted failure on call {index}"),
                )),
                Behaviour::Panic => panic!("scripted panic on call {index}"),
            }
        })
    }

    fn serialized(&self) -> bool {
        self.serialized
    }
}

/// A transformer that records jobs and "writes" one output per input.
#[derive(Clone, Default)]
pub struct FakeTransformer {
    jobs: Arc<Mutex<Vec<TransformJob>>>,
    fail: bool,
}

impl FakeTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<TransformJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<dyn Transformer> {
        Arc::new(self)
    }
}

impl Transformer for FakeTransformer {
    fn transform<'a>(
        &'a self,
        job: &'a TransformJob,
    ) -> BoxFuture<'a, anyhow::Result<TransformOutput>> {
        Box::pin(async move {
            self.jobs.lock().unwrap().push(job.clone());
            if self.fail {
                anyhow::bail!("fake transform failed for {}", job.task);
            }
            Ok(TransformOutput {
                written: job
                    .inputs
                    .iter()
                    .map(|input| job.dest.join(input.relative()))
                    .collect(),
            })
        })
    }
}

/// Collects reported errors as `(id, message)` pairs.
#[derive(Clone, Default)]
pub struct RecordingSink {
    reports: Arc<Mutex<Vec<(DescriptorId, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(DescriptorId, String)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn into_arc(self) -> Arc<dyn ErrorSink> {
        Arc::new(self)
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, id: &DescriptorId, error: &BuildError) {
        self.reports
            .lock()
            .unwrap()
            .push((id.clone(), error.to_string()));
    }
}
