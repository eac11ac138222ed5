// src/handlers/mod.rs

//! Built-in task handlers.
//!
//! Each handler checks the descriptor fields it needs (lazily, per dispatch),
//! expands its input globs and hands a [`TransformJob`] to its transformer.

pub mod css;
pub mod html;
pub mod icons;
pub mod img;
pub mod javascript;
pub mod reload;
pub mod static_files;

use std::path::Path;

use tracing::debug;

use crate::config::ResolvedDescriptor;
use crate::errors::{BuildError, Result};
use crate::registry::{HandlerOutcome, TaskContext};
use crate::transform::{TransformJob, Transformer};
use crate::watch::collect_matching_files;

pub use css::CssHandler;
pub use html::HtmlHandler;
pub use icons::IconsHandler;
pub use img::ImgHandler;
pub use javascript::JavascriptHandler;
pub use reload::ReloadHandler;
pub use static_files::StaticHandler;

pub const HTML: &str = "html";
pub const CSS: &str = "css";
pub const JAVASCRIPT: &str = "javascript";
pub const IMG: &str = "img";
pub const STATIC: &str = "static";
pub const ICONS: &str = "icons";
/// Watch-only task: no transform, just a browser reload (e.g. server-side
/// templates served by another process).
pub const RELOAD: &str = "reload";

/// Insert `value` under `key` unless the descriptor already set it.
pub(crate) fn with_default(params: &mut toml::Table, key: &str, value: impl Into<toml::Value>) {
    if !params.contains_key(key) {
        params.insert(key.to_string(), value.into());
    }
}

/// Expand `inputs`, build the job and run it through `transformer`.
pub(crate) async fn run_transform(
    transformer: &dyn Transformer,
    ctx: &TaskContext,
    descriptor: &ResolvedDescriptor,
    inputs: &[String],
    dest: &Path,
    params: toml::Table,
) -> Result<HandlerOutcome> {
    let task = descriptor.name();
    let files = collect_matching_files(ctx.fs.as_ref(), inputs)
        .map_err(|e| BuildError::transform(task, e))?;

    debug!(task = %task, inputs = files.len(), dest = ?dest, "running transform");

    let job = TransformJob {
        task: task.to_string(),
        inputs: files,
        dest: dest.to_path_buf(),
        params,
        env: ctx.env.clone(),
    };

    let output = transformer
        .transform(&job)
        .await
        .map_err(|e| BuildError::transform(task, e))?;

    Ok(HandlerOutcome {
        written: output.written,
    })
}
