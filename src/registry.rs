// src/registry.rs

//! Typed mapping from task name to handler.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ResolvedDescriptor;
use crate::env::BuildEnv;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::handlers;
use crate::transform::Transformer;
use crate::types::{BoxFuture, TaskName};

/// Shared, read-only state every handler invocation receives.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub env: Arc<BuildEnv>,
    pub fs: Arc<dyn FileSystem>,
}

impl TaskContext {
    pub fn new(env: Arc<BuildEnv>, fs: Arc<dyn FileSystem>) -> Self {
        Self { env, fs }
    }
}

/// What a successful handler invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerOutcome {
    pub written: Vec<PathBuf>,
}

/// Common capability of every task type.
///
/// A handler performs its transform for one resolved descriptor and does not
/// care whether it was called from `build` or from a file change.
pub trait TaskHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        ctx: &'a TaskContext,
        descriptor: &'a ResolvedDescriptor,
    ) -> BoxFuture<'a, Result<HandlerOutcome>>;

    /// Whether invocations for the same descriptor must never overlap.
    fn serialized(&self) -> bool {
        false
    }
}

#[derive(Clone, Default)]
pub struct TaskRegistry {
    handlers: BTreeMap<TaskName, Arc<dyn TaskHandler>>,
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("tasks", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in task type.
    ///
    /// `tool` performs real transforms (templating, styles, bundling,
    /// sprites); `copy` moves files verbatim (static assets, images).
    pub fn with_builtin_handlers(tool: Arc<dyn Transformer>, copy: Arc<dyn Transformer>) -> Self {
        let mut registry = Self::new();
        registry.register(handlers::HTML, Arc::new(handlers::HtmlHandler::new(tool.clone())));
        registry.register(handlers::CSS, Arc::new(handlers::CssHandler::new(tool.clone())));
        registry.register(
            handlers::JAVASCRIPT,
            Arc::new(handlers::JavascriptHandler::new(tool.clone())),
        );
        registry.register(handlers::IMG, Arc::new(handlers::ImgHandler::new(copy.clone())));
        registry.register(handlers::STATIC, Arc::new(handlers::StaticHandler::new(copy)));
        registry.register(handlers::ICONS, Arc::new(handlers::IconsHandler::new(tool)));
        registry.register(handlers::RELOAD, Arc::new(handlers::ReloadHandler));
        registry
    }

    /// Register (or replace) the handler for `name`.
    pub fn register(&mut self, name: impl Into<TaskName>, handler: Arc<dyn TaskHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
