// src/errors.rs

//! Crate-wide error type and aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// The configuration file exists but could not be read or parsed.
    #[error("failed to load configuration {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// A task descriptor lacks a field its handler requires.
    #[error("task '{task}' is missing required field `{field}`")]
    ConfigShape { task: String, field: &'static str },

    /// An external transform (bundler, templater, codec...) failed.
    #[error("task '{task}' transform failed: {source}")]
    Transform {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    /// A job on a serialized queue failed or panicked.
    #[error("queued invocation of '{task}' failed: {reason}")]
    QueueTask { task: String, reason: String },

    #[error("no handler registered for task '{0}'")]
    UnknownTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    pub fn transform(task: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        BuildError::Transform {
            task: task.into(),
            source: source.into(),
        }
    }

    pub fn shape(task: impl Into<String>, field: &'static str) -> Self {
        BuildError::ConfigShape {
            task: task.into(),
            field,
        }
    }

    /// Only configuration-load failures abort the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BuildError::ConfigLoad { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildError>;
