// src/watch/patterns.rs

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::fs::FileSystem;
use crate::paths::{glob_base, NEGATION};

/// Compiled form of a resolved pattern list such as
/// `["!/p/source/js/sw.js", "/p/source/js/**/*.js"]`.
///
/// A path matches when at least one positive glob matches and no negated
/// glob does. Patterns must already be absolute.
#[derive(Clone)]
pub struct WatchPattern {
    positive: Vec<String>,
    include_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPattern")
            .field("positive", &self.positive)
            .finish_non_exhaustive()
    }
}

impl WatchPattern {
    pub fn compile(patterns: &[String]) -> Result<Self> {
        let mut positive = Vec::new();
        let mut negated = Vec::new();

        for pat in patterns {
            match pat.strip_prefix(NEGATION) {
                Some(rest) => negated.push(rest.to_string()),
                None => positive.push(pat.clone()),
            }
        }

        let include_set = build_globset(&positive).context("building watch globset")?;
        let exclude_set = if negated.is_empty() {
            None
        } else {
            Some(build_globset(&negated).context("building negated globset")?)
        };

        Ok(Self {
            positive,
            include_set,
            exclude_set,
        })
    }

    /// Positive (non-negated) patterns in declaration order.
    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn matches(&self, path: &Path) -> bool {
        let text = normalized_str(path);
        if !self.include_set.is_match(&text) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(&text) {
                return false;
            }
        }
        true
    }
}

/// A file picked up by glob expansion, with the literal directory its
/// pattern started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedFile {
    pub path: PathBuf,
    pub base: PathBuf,
}

impl MatchedFile {
    /// Path relative to the glob base (`img/logo.png` for
    /// `/p/source/**/*.png` matching `/p/source/img/logo.png`).
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }
}

/// Expand resolved globs into the concrete files they match.
///
/// Files come out grouped by the first positive pattern that matched them,
/// in pattern order, each file at most once.
pub fn collect_matching_files(fs: &dyn FileSystem, patterns: &[String]) -> Result<Vec<MatchedFile>> {
    let compiled = WatchPattern::compile(patterns)?;
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut files = Vec::new();

    for pat in compiled.positive() {
        let base = glob_base(pat);
        let single = build_globset(std::slice::from_ref(pat))?;

        let mut found = Vec::new();
        if fs.is_file(Path::new(pat)) {
            found.push(PathBuf::from(pat));
        } else if fs.is_dir(&base) {
            let mut stack = vec![base.clone()];
            while let Some(dir) = stack.pop() {
                for path in fs.read_dir(&dir)? {
                    if fs.is_dir(&path) {
                        stack.push(path);
                    } else if fs.is_file(&path) && single.is_match(normalized_str(&path)) {
                        found.push(path);
                    }
                }
            }
        }

        found.sort();
        for path in found {
            if compiled.matches(&path) && seen.insert(path.clone()) {
                files.push(MatchedFile {
                    path,
                    base: base.clone(),
                });
            }
        }
    }

    Ok(files)
}

/// Build a GlobSet where `*` does not cross directory separators.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn normalized_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn pats(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn negated_pattern_excludes_match() {
        let p = WatchPattern::compile(&pats(&["!/p/js/sw.js", "/p/js/**/*.js"])).unwrap();
        assert!(p.matches(Path::new("/p/js/index.js")));
        assert!(p.matches(Path::new("/p/js/lib/util.js")));
        assert!(!p.matches(Path::new("/p/js/sw.js")));
        assert!(!p.matches(Path::new("/p/css/index.css")));
    }

    #[test]
    fn single_star_stays_within_one_directory() {
        let p = WatchPattern::compile(&pats(&["/p/img/*"])).unwrap();
        assert!(p.matches(Path::new("/p/img/a.png")));
        assert!(!p.matches(Path::new("/p/img/sub/b.png")));
    }

    #[test]
    fn collects_files_relative_to_glob_base() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/source/img/logo.png", b"png".to_vec());
        fs.add_file("/p/source/img/icons/a.png", b"png".to_vec());
        fs.add_file("/p/source/css/index.css", b"css".to_vec());

        let files = collect_matching_files(&fs, &pats(&["/p/source/img/**/*"])).unwrap();
        let rel: Vec<_> = files.iter().map(|f| f.relative().to_path_buf()).collect();

        assert_eq!(rel, vec![PathBuf::from("icons/a.png"), PathBuf::from("logo.png")]);
    }

    #[test]
    fn literal_entry_matches_itself() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/source/js/sw.js", b"sw".to_vec());

        let files = collect_matching_files(&fs, &pats(&["/p/source/js/sw.js"])).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative(), Path::new("sw.js"));
    }
}
