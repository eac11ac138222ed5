// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ConfigurationTable, TaskDescriptor};
use crate::errors::Result;
use crate::paths::glob_base;
use crate::types::DescriptorId;
use crate::watch::patterns::WatchPattern;

/// Callback invoked once per matching descriptor per filesystem event.
pub type OnTrigger = Arc<dyn Fn(DescriptorId, TaskDescriptor) + Send + Sync>;

/// One watched descriptor: its identity, declaration and compiled globs.
#[derive(Debug, Clone)]
pub struct WatchEntry {
    pub id: DescriptorId,
    pub descriptor: TaskDescriptor,
    pub pattern: WatchPattern,
}

/// Maps changed paths to the descriptors that watch them.
#[derive(Debug, Clone, Default)]
pub struct WatchRouter {
    entries: Vec<WatchEntry>,
}

impl WatchRouter {
    /// Compile every descriptor's resolved `watch_on` list.
    ///
    /// Descriptors without `watch_on` are skipped here; their handler reports
    /// the missing field if it needs one.
    pub fn from_table(table: &ConfigurationTable, root: &Path) -> Result<Self> {
        let mut entries = Vec::new();

        for (id, descriptor) in table.descriptors() {
            let resolved = descriptor.resolve(root);
            let Some(patterns) = resolved.watch_on() else {
                debug!(descriptor = %id, "no watch_on; not watching");
                continue;
            };
            let pattern = WatchPattern::compile(patterns)?;
            entries.push(WatchEntry {
                id,
                descriptor: descriptor.clone(),
                pattern,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors interested in `path`, in table order.
    pub fn route(&self, path: &Path) -> Vec<&WatchEntry> {
        self.entries
            .iter()
            .filter(|e| e.pattern.matches(path))
            .collect()
    }

    /// Directories that must be watched so every pattern is covered: the
    /// root itself plus any pattern base that lives outside it.
    ///
    /// Out-of-root bases that do not exist yet cannot be watched; they are
    /// skipped with a warning and need a restart once created.
    pub fn watch_dirs(&self, root: &Path) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();
        dirs.insert(root.to_path_buf());
        for entry in &self.entries {
            for pat in entry.pattern.positive() {
                let base = glob_base(pat);
                if base.starts_with(root) {
                    continue;
                }
                if base.is_dir() {
                    dirs.insert(base);
                } else {
                    warn!(
                        task = %entry.id.task,
                        index = entry.id.index,
                        base = ?base,
                        "pattern base outside the root does not exist; not watched"
                    );
                }
            }
        }
        dirs.into_iter().collect()
    }
}

/// Keeps the filesystem watch alive. Dropping it (or calling
/// [`WatchHandle::stop`]) releases the OS watches and ends the event loop.
pub struct WatchHandle {
    _inner: RecommendedWatcher,
    event_loop: JoinHandle<()>,
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle").finish()
    }
}

impl WatchHandle {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.event_loop.abort();
        debug!("file watcher stopped");
    }
}

/// Watch every descriptor's `watch_on` patterns under `root` and call
/// `on_trigger` for each matching change.
pub fn watch_all(
    table: &ConfigurationTable,
    root: &Path,
    on_trigger: OnTrigger,
) -> Result<WatchHandle> {
    let router = WatchRouter::from_table(table, root)?;
    let dirs = router.watch_dirs(root);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("assetline: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetline: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::Recursive)?;
    }
    info!(?dirs, descriptors = router.entries().len(), "file watcher started");

    let event_loop = spawn_event_loop(router, event_rx, on_trigger);

    Ok(WatchHandle {
        _inner: watcher,
        event_loop,
    })
}

/// Consume filesystem events and fan them out to `on_trigger`.
///
/// Split out from [`watch_all`] so tests can feed synthetic events.
pub fn spawn_event_loop(
    router: WatchRouter,
    mut events: mpsc::UnboundedReceiver<Event>,
    on_trigger: OnTrigger,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if !is_content_change(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");

            // Identical paths inside one event count once.
            let paths: BTreeSet<PathBuf> = event.paths.into_iter().collect();
            for path in paths {
                let matched = router.route(&path);
                if matched.is_empty() {
                    continue;
                }
                for entry in matched {
                    debug!(
                        task = %entry.id.task,
                        index = entry.id.index,
                        path = ?path,
                        "watch match -> triggering task"
                    );
                    on_trigger(entry.id.clone(), entry.descriptor.clone());
                }
            }
        }
        warn!("watch event channel closed; watcher loop finished");
    })
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TaskDescriptor, TaskEntry};
    use crate::paths::Patterns;
    use crate::types::DevServerKind;

    fn table(patterns: Vec<&str>) -> ConfigurationTable {
        let mut descriptor = TaskDescriptor::new("static");
        descriptor.watch_on = Some(Patterns::from(patterns));
        ConfigurationTable::new_unchecked(
            "dist".to_string(),
            DevServerKind::None,
            None,
            vec![("static".to_string(), TaskEntry::One(descriptor))],
        )
    }

    #[test]
    fn patterns_inside_root_only_watch_the_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("site");
        let router = WatchRouter::from_table(&table(vec!["source/**/*", "!source/tmp/*"]), &root).unwrap();

        assert_eq!(router.watch_dirs(&root), vec![root.clone()]);
    }

    #[test]
    fn existing_base_outside_root_is_added() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("site");
        let shared = dir.path().join("shared");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::create_dir_all(&shared).unwrap();

        let router = WatchRouter::from_table(&table(vec!["source/**/*", "../shared/**/*.svg"]), &root).unwrap();
        let dirs = router.watch_dirs(&root);

        assert_eq!(dirs.len(), 2);
        assert!(dirs.contains(&root));
        assert!(dirs.contains(&shared));
    }

    #[test]
    fn missing_base_outside_root_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("site");
        std::fs::create_dir_all(&root).unwrap();

        let router = WatchRouter::from_table(&table(vec!["../not-there/**/*"]), &root).unwrap();

        assert_eq!(router.watch_dirs(&root), vec![root.clone()]);
    }
}
