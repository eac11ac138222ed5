// src/env.rs

//! Immutable per-process build settings.
//!
//! Everything handlers need to know about the current run (mode, build
//! version, target browsers) lives in [`BuildEnv`], created once at startup and
//! shared by `Arc`. Handlers never consult ambient process environment
//! variables; the command transformer exports the relevant values to child
//! processes explicitly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Mode;

/// Length of the short cache-busting suffix.
pub const HASH_LEN: usize = 8;

/// Per-process random token used for cache-busting names and as the cache
/// namespace of generated service-worker code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion {
    token: String,
}

impl BuildVersion {
    /// Derive a fresh token from the wall clock and process id.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut hasher = blake3::Hasher::new();
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());
        Self {
            token: hasher.finalize().to_hex().to_string(),
        }
    }

    /// Use a fixed token (tests, reproducible builds).
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Short suffix for file names, e.g. `index.3f2a9c1b.js`.
    pub fn hash(&self) -> &str {
        let end = self
            .token
            .char_indices()
            .nth(HASH_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.token.len());
        &self.token[..end]
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Settings shared read-only by every handler invocation.
#[derive(Debug, Clone)]
pub struct BuildEnv {
    root: PathBuf,
    mode: Mode,
    build_version: BuildVersion,
    browserslist: Option<String>,
}

impl BuildEnv {
    pub fn new(root: impl Into<PathBuf>, minify: bool, build_version: BuildVersion) -> Self {
        let mode = if minify {
            Mode::Production
        } else {
            Mode::Development
        };
        Self {
            root: root.into(),
            mode,
            build_version,
            browserslist: None,
        }
    }

    pub fn with_browserslist(mut self, browserslist: Option<String>) -> Self {
        self.browserslist = browserslist;
        self
    }

    /// Project root every declared path is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn minify(&self) -> bool {
        self.mode == Mode::Production
    }

    /// Source maps are only emitted for development builds.
    pub fn source_maps(&self) -> bool {
        !self.minify()
    }

    pub fn build_version(&self) -> &BuildVersion {
        &self.build_version
    }

    pub fn browserslist(&self) -> Option<&str> {
        self.browserslist.as_deref()
    }

    /// Variables exported to external tools.
    pub fn exported_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![
            ("NODE_ENV", self.mode.as_node_env().to_string()),
            ("BUILD_VERSION", self.build_version.token().to_string()),
            ("HASH", self.build_version.hash().to_string()),
        ];
        if let Some(list) = &self.browserslist {
            vars.push(("BROWSERSLIST", list.clone()));
        }
        vars
    }
}
