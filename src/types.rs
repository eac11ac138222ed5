use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Which dev-server collaborator `watch` mode starts.
///
/// - `None`: files are rebuilt but nobody is told. Used when a config file
///   omits `dev_server`.
/// - `LiveReload`: a livereload-style channel receives reload signals.
/// - `BrowserSync`: a browser-sync-style channel receives reload signals
///   (what the bundled configuration selects).
///
/// Also accepted: `"null"` for `none`, `"browser-sync"` for `browsersync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevServerKind {
    #[serde(alias = "null")]
    None,
    LiveReload,
    #[serde(alias = "browser-sync")]
    BrowserSync,
}

impl Default for DevServerKind {
    fn default() -> Self {
        DevServerKind::None
    }
}

impl fmt::Display for DevServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DevServerKind::None => "none",
            DevServerKind::LiveReload => "livereload",
            DevServerKind::BrowserSync => "browsersync",
        };
        f.write_str(s)
    }
}

/// Build flavour, derived from `--minify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Value exported to external tools as `NODE_ENV`.
    pub fn as_node_env(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

/// Identity of one descriptor inside the configuration table.
///
/// Scalar entries use index 0; fan-out lists use the list position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId {
    pub task: TaskName,
    pub index: usize,
}

impl DescriptorId {
    pub fn new(task: impl Into<TaskName>, index: usize) -> Self {
        Self {
            task: task.into(),
            index,
        }
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.task, self.index)
    }
}

/// Final state of a single handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Boxed, sendable future used at the trait seams (handlers, transformers).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
