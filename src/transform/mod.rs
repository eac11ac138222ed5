// src/transform/mod.rs

//! External transform collaborators.
//!
//! Handlers decide *what* to transform; a [`Transformer`] does the actual
//! work (templating, bundling, compressing, copying). Production code uses:
//!
//! - [`CopyTransformer`] copies matched inputs into the destination.
//! - [`CommandTransformer`] runs the task's `command` param as an external
//!   tool and falls back to another transformer when no command is set.
//!
//! Tests swap in fakes that record jobs and simulate latency or failures.

pub mod command;
pub mod copy;

use std::path::PathBuf;
use std::sync::Arc;

use crate::env::BuildEnv;
use crate::types::{BoxFuture, TaskName};
use crate::watch::MatchedFile;

pub use command::CommandTransformer;
pub use copy::CopyTransformer;

/// Everything a transformer needs for one invocation.
#[derive(Debug, Clone)]
pub struct TransformJob {
    pub task: TaskName,
    pub inputs: Vec<MatchedFile>,
    pub dest: PathBuf,
    /// Handler params with handler defaults applied.
    pub params: toml::Table,
    pub env: Arc<BuildEnv>,
}

impl TransformJob {
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }
}

/// Files produced by a transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    pub written: Vec<PathBuf>,
}

/// Opaque `transform(files, options) -> output files` collaborator.
pub trait Transformer: Send + Sync {
    fn transform<'a>(&'a self, job: &'a TransformJob) -> BoxFuture<'a, anyhow::Result<TransformOutput>>;
}

impl<T: Transformer + ?Sized> Transformer for Arc<T> {
    fn transform<'a>(&'a self, job: &'a TransformJob) -> BoxFuture<'a, anyhow::Result<TransformOutput>> {
        (**self).transform(job)
    }
}
