// src/paths.rs

//! Resolution of declared globs and paths against the project root.
//!
//! Everything a task declares (`watch_on`, `entry`, `dest`, path-like params)
//! is written relative to the project root. Handlers must only ever see
//! absolute paths, so resolution happens once per dispatch right before the
//! handler runs.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// Marker that negates a glob (`!source/js/sw.js`).
pub const NEGATION: char = '!';

/// One glob or an ordered list of globs, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    /// Resolve every pattern against `root`, keeping the scalar/list shape.
    pub fn resolve(&self, root: &Path) -> Patterns {
        match self {
            Patterns::One(p) => Patterns::One(resolve(p, root)),
            Patterns::Many(list) => Patterns::Many(resolve_all(list, root)),
        }
    }

    /// Flatten into a list, preserving order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Patterns::One(p) => vec![p.clone()],
            Patterns::Many(list) => list.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Patterns::One(p) => p.is_empty(),
            Patterns::Many(list) => list.is_empty(),
        }
    }
}

impl From<&str> for Patterns {
    fn from(value: &str) -> Self {
        Patterns::One(value.to_string())
    }
}

impl From<Vec<&str>> for Patterns {
    fn from(value: Vec<&str>) -> Self {
        Patterns::Many(value.into_iter().map(str::to_string).collect())
    }
}

/// Resolve a single glob against `root`.
///
/// A leading `!` survives resolution: `!x/y` becomes `!<root>/x/y`.
/// Absolute inputs come back unchanged apart from lexical normalisation,
/// which makes the function idempotent.
pub fn resolve(pattern: &str, root: &Path) -> String {
    match pattern.strip_prefix(NEGATION) {
        Some(rest) => format!("{NEGATION}{}", resolve_plain(rest, root)),
        None => resolve_plain(pattern, root),
    }
}

/// Resolve a list of globs element-wise.
pub fn resolve_all(patterns: &[String], root: &Path) -> Vec<String> {
    patterns.iter().map(|p| resolve(p, root)).collect()
}

/// Resolve a plain (non-glob) path against `root`.
pub fn resolve_path(path: &str, root: &Path) -> PathBuf {
    PathBuf::from(resolve_plain(path, root))
}

fn resolve_plain(path: &str, root: &Path) -> String {
    let joined = root.join(path);
    normalize(&joined).to_string_lossy().replace('\\', "/")
}

/// Lexically collapse `.` and `..` components without touching the disk.
///
/// Glob metacharacters are ordinary characters here, so `**` and `*.js`
/// survive untouched.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Split a glob into its literal directory prefix and the pattern remainder.
///
/// `/p/source/img/**/*.png` -> (`/p/source/img`, `**/*.png`). Outputs are
/// written relative to this base so sub-directories are preserved.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component.as_os_str());
    }
    // A literal file path has itself as "base"; use its directory instead.
    if base.as_os_str() == pattern {
        if let Some(parent) = base.parent() {
            return parent.to_path_buf();
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_pattern_is_joined_onto_root() {
        let root = Path::new("/project");
        assert_eq!(resolve("source/css/**/*.css", root), "/project/source/css/**/*.css");
    }

    #[test]
    fn negation_marker_is_kept() {
        let root = Path::new("/project");
        assert_eq!(resolve("!source/js/sw.js", root), "!/project/source/js/sw.js");
    }

    #[test]
    fn absolute_input_is_unchanged() {
        let root = Path::new("/project");
        assert_eq!(resolve("/elsewhere/a.js", root), "/elsewhere/a.js");
    }

    #[test]
    fn dot_segments_are_collapsed() {
        let root = Path::new("/project/sub");
        assert_eq!(resolve("./../dist", root), "/project/dist");
    }

    #[test]
    fn list_order_is_preserved() {
        let root = Path::new("/r");
        let list = Patterns::from(vec!["!b", "a/**"]);
        assert_eq!(
            list.resolve(root),
            Patterns::Many(vec!["!/r/b".to_string(), "/r/a/**".to_string()])
        );
    }

    #[test]
    fn glob_base_stops_at_first_wildcard() {
        assert_eq!(glob_base("/p/source/img/**/*.png"), PathBuf::from("/p/source/img"));
        assert_eq!(glob_base("/p/source/js/sw.js"), PathBuf::from("/p/source/js"));
    }
}
