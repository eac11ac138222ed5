// src/lib.rs

pub mod cli;
pub mod config;
pub mod devserver;
pub mod engine;
pub mod env;
pub mod errors;
pub mod fs;
pub mod handlers;
pub mod logging;
pub mod paths;
pub mod registry;
pub mod report;
pub mod transform;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::ConfigurationTable;
use crate::engine::{dispatch_all, live_trigger, BuildReport, Dispatcher};
use crate::env::{BuildEnv, BuildVersion};
use crate::fs::{FileSystem, RealFileSystem};
use crate::registry::{TaskContext, TaskRegistry};
use crate::transform::{CommandTransformer, CopyTransformer, Transformer};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration loading (fatal on failure)
/// - build environment, filesystem and task registry
/// - dispatcher and error sink
/// - for `watch`: dev-server, file watcher and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let root = project_root(&args.root)?;
    let factory = config::locate(&root, args.config.as_deref());
    let table = config::load_from_factory(factory)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    if args.command == Command::Clean {
        engine::clean(fs.as_ref(), &root, &table)?;
        return Ok(());
    }

    let env = BuildEnv::new(root.clone(), args.minify, BuildVersion::generate())
        .with_browserslist(table.browserslist().map(str::to_string));
    info!(
        root = %root.display(),
        mode = ?env.mode(),
        build_version = %env.build_version(),
        "build environment ready"
    );

    let dispatcher = Arc::new(Dispatcher::new(
        builtin_registry(Arc::clone(&fs)),
        TaskContext::new(Arc::new(env), fs),
        report::log_sink(),
    ));

    match args.command {
        Command::Build => {
            let report = dispatch_all(&dispatcher, &table).await;
            log_report(&report);
            Ok(())
        }
        Command::Watch => run_watch(dispatcher, &table, &root).await,
        Command::Clean => Ok(()),
    }
}

/// Registry wired to the production transformers: configured commands for
/// tool-backed tasks, plain copies for everything else.
pub fn builtin_registry(fs: Arc<dyn FileSystem>) -> TaskRegistry {
    let copy: Arc<dyn Transformer> = Arc::new(CopyTransformer::new(fs));
    let tool: Arc<dyn Transformer> = Arc::new(CommandTransformer::new(Arc::clone(&copy)));
    TaskRegistry::with_builtin_handlers(tool, copy)
}

async fn run_watch(dispatcher: Arc<Dispatcher>, table: &ConfigurationTable, root: &Path) -> Result<()> {
    let devserver = devserver::from_kind(table.dev_server());
    devserver.start();

    let handle = watch::watch_all(
        table,
        root,
        live_trigger(Arc::clone(&dispatcher), Arc::clone(&devserver)),
    )?;

    let report = dispatch_all(&dispatcher, table).await;
    log_report(&report);
    info!("watching for changes; press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C; stopping watch");
    }
    handle.stop();
    info!("watch stopped");
    Ok(())
}

fn log_report(report: &BuildReport) {
    if !report.is_clean() {
        let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
        warn!(?failed, "some tasks failed; see errors above");
    }
}

fn project_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize()
        .with_context(|| format!("resolving project root {:?}", root))
}
