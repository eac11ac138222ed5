// src/report.rs

//! The single user-visible channel for handler-level failures.
//!
//! Nothing below the dispatcher is allowed to take the process down; errors
//! are handed to an [`ErrorSink`] and the orchestrator moves on.

use std::sync::Arc;

use tracing::error;

use crate::errors::BuildError;
use crate::types::DescriptorId;

pub trait ErrorSink: Send + Sync {
    fn report(&self, id: &DescriptorId, error: &BuildError);
}

/// Logs every failure through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, id: &DescriptorId, error: &BuildError) {
        error!(
            task = %id.task,
            index = id.index,
            error = %error,
            "task failed"
        );
    }
}

pub fn log_sink() -> Arc<dyn ErrorSink> {
    Arc::new(LogErrorSink)
}
