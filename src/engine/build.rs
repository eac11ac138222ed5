// src/engine/build.rs

//! One-shot orchestration: `build` and `clean`.

use std::path::Path;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::config::ConfigurationTable;
use crate::engine::dispatcher::Dispatcher;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::paths::{normalize, resolve_path};
use crate::types::{DescriptorId, TaskOutcome};

/// Tally of one [`dispatch_all`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub succeeded: Vec<DescriptorId>,
    pub failed: Vec<DescriptorId>,
}

impl BuildReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Dispatch every descriptor once, in declaration order, and wait for all of
/// them to settle.
///
/// Invocations run concurrently; the order only fixes when each one starts.
pub async fn dispatch_all(dispatcher: &Dispatcher, table: &ConfigurationTable) -> BuildReport {
    let tickets: Vec<_> = table
        .descriptors()
        .map(|(id, descriptor)| dispatcher.dispatch(id, descriptor))
        .collect();
    info!(invocations = tickets.len(), "dispatched all tasks");

    let mut report = BuildReport::default();
    for ticket in tickets {
        let id = ticket.id().clone();
        match ticket.outcome().await {
            TaskOutcome::Success => report.succeeded.push(id),
            TaskOutcome::Failed => report.failed.push(id),
        }
    }

    if report.is_clean() {
        info!(succeeded = report.succeeded.len(), "build finished");
    } else {
        warn!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "build finished with failures"
        );
    }
    report
}

/// Remove the top-level destination tree.
///
/// `dest` must lie strictly below `root`; anything else (the root itself, a
/// parent, an unrelated absolute path) is refused before touching the disk.
pub fn clean(fs: &dyn FileSystem, root: &Path, table: &ConfigurationTable) -> Result<()> {
    let root = normalize(root);
    let dest = resolve_path(table.dest(), &root);
    if dest == root || !dest.starts_with(&root) {
        return Err(BuildError::Other(anyhow!(
            "refusing to clean {:?}: dest {:?} is not inside the project root {:?}",
            dest,
            table.dest(),
            root
        )));
    }
    info!(dest = %dest.display(), "cleaning destination");
    fs.remove_dir_all(&dest)?;
    Ok(())
}
