// src/devserver.rs

//! Dev-server collaborator: tells browsers to refresh after a rebuild.
//!
//! The orchestrator only reports *what* changed. Whether that becomes a
//! full-page reload or an in-place style injection is decided here, by the
//! dev-server implementation. Serving files and speaking the livereload or
//! browser-sync wire protocol happens outside this crate; consumers
//! subscribe to the broadcast channel.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::types::{DevServerKind, TaskName};

/// Default browser-sync port.
pub const BROWSERSYNC_PORT: u16 = 3030;
/// Default livereload port.
pub const LIVERELOAD_PORT: u16 = 35729;

/// A finished rebuild, as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChange {
    pub task: TaskName,
    pub dest: Option<PathBuf>,
    pub written: Vec<PathBuf>,
}

/// What connected browsers should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadSignal {
    FullReload,
    InjectStyles { files: Vec<PathBuf> },
}

pub trait DevServer: Send + Sync {
    fn kind(&self) -> DevServerKind;

    /// Called once before the first build in watch mode.
    fn start(&self);

    fn notify(&self, change: &AssetChange);
}

/// Used when `dev_server = "none"`.
#[derive(Debug, Clone, Default)]
pub struct NoopDevServer;

impl DevServer for NoopDevServer {
    fn kind(&self) -> DevServerKind {
        DevServerKind::None
    }

    fn start(&self) {}

    fn notify(&self, change: &AssetChange) {
        debug!(task = %change.task, "no dev-server configured; change not announced");
    }
}

/// Publishes [`ReloadSignal`]s on a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastDevServer {
    kind: DevServerKind,
    port: u16,
    tx: broadcast::Sender<ReloadSignal>,
}

impl BroadcastDevServer {
    pub fn new(kind: DevServerKind) -> Self {
        let port = match kind {
            DevServerKind::LiveReload => LIVERELOAD_PORT,
            _ => BROWSERSYNC_PORT,
        };
        let (tx, _rx) = broadcast::channel(64);
        Self { kind, port, tx }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.tx.subscribe()
    }

    /// Style-only changes are injected in place; anything else reloads.
    pub fn signal_for(change: &AssetChange) -> ReloadSignal {
        if change.task == "css" {
            ReloadSignal::InjectStyles {
                files: change.written.clone(),
            }
        } else {
            ReloadSignal::FullReload
        }
    }
}

impl DevServer for BroadcastDevServer {
    fn kind(&self) -> DevServerKind {
        self.kind
    }

    fn start(&self) {
        info!(
            kind = %self.kind,
            port = self.port,
            subscribers = self.tx.receiver_count(),
            "dev-server channel ready; reload signals are published in-process only, no HTTP server is started"
        );
    }

    fn notify(&self, change: &AssetChange) {
        let signal = Self::signal_for(change);
        debug!(task = %change.task, ?signal, "announcing change");
        // No subscribers is fine; nobody is listening yet.
        let _ = self.tx.send(signal);
    }
}

/// Build the dev-server selected by the configuration.
pub fn from_kind(kind: DevServerKind) -> Arc<dyn DevServer> {
    match kind {
        DevServerKind::None => Arc::new(NoopDevServer),
        other => Arc::new(BroadcastDevServer::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(task: &str) -> AssetChange {
        AssetChange {
            task: task.to_string(),
            dest: Some(PathBuf::from("/p/dist")),
            written: vec![PathBuf::from("/p/dist/assets/css/index.css")],
        }
    }

    #[test]
    fn css_changes_inject_styles_everything_else_reloads() {
        let server = BroadcastDevServer::new(DevServerKind::BrowserSync);
        let mut rx = server.subscribe();

        server.notify(&change("css"));
        server.notify(&change("html"));

        assert_eq!(
            rx.try_recv().unwrap(),
            ReloadSignal::InjectStyles {
                files: vec![PathBuf::from("/p/dist/assets/css/index.css")]
            }
        );
        assert_eq!(rx.try_recv().unwrap(), ReloadSignal::FullReload);
    }

    #[test]
    fn port_follows_kind() {
        assert_eq!(BroadcastDevServer::new(DevServerKind::BrowserSync).port(), BROWSERSYNC_PORT);
        assert_eq!(BroadcastDevServer::new(DevServerKind::LiveReload).port(), LIVERELOAD_PORT);
    }

    #[test]
    fn kind_selects_implementation() {
        assert_eq!(from_kind(DevServerKind::None).kind(), DevServerKind::None);
        assert_eq!(from_kind(DevServerKind::LiveReload).kind(), DevServerKind::LiveReload);
    }
}
