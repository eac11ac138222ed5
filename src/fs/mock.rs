// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem for tests. Paths are used verbatim (no
/// canonicalisation), so tests should use absolute paths throughout.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = BTreeMap::new();
        files.insert(PathBuf::from("/"), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), MockEntry::File(content.into()));

        if let Some(parent) = path.parent() {
            Self::ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, &path);
        }
    }

    /// Contents of a file, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    fn ensure_dir_entry(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if let Some(parent) = path.parent() {
            if parent != path {
                Self::ensure_dir_entry(files, parent);
                Self::link_child(files, parent, path);
            }
        }
    }

    fn link_child(files: &mut BTreeMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.add_file(path, contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        matches!(files.get(path), Some(MockEntry::Dir(_)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        Self::ensure_dir_entry(&mut files, path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        files.retain(|p, _| !p.starts_with(path));
        if let Some(parent) = path.parent() {
            if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    children.retain(|c| c != name);
                }
            }
        }
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_dir_all_drops_nested_entries() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/dist/assets/app.js", b"x".to_vec());
        fs.add_file("/p/source/app.js", b"y".to_vec());

        fs.remove_dir_all(Path::new("/p/dist")).unwrap();

        assert!(!fs.exists(Path::new("/p/dist")));
        assert!(!fs.exists(Path::new("/p/dist/assets/app.js")));
        assert!(fs.is_file(Path::new("/p/source/app.js")));
        assert_eq!(fs.read_dir(Path::new("/p")).unwrap(), vec![PathBuf::from("/p/source")]);
    }
}
