// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigurationTable, RawConfig};
use crate::config::validate::normalize;
use crate::errors::{BuildError, Result};

/// Name of the project-level configuration file, looked up under the root.
pub const CONFIG_FILE_NAME: &str = "assetline.toml";

/// Configuration used when the project does not provide its own.
pub const BUNDLED_DEFAULT: &str = include_str!("default.toml");

/// Something that produces the raw configuration.
///
/// `produce` consumes the factory, so a loaded configuration is evaluated
/// exactly once.
pub trait ConfigFactory: Send {
    /// Where this configuration comes from (for logs and errors).
    fn origin(&self) -> &Path;

    fn produce(self: Box<Self>) -> Result<RawConfig>;
}

/// Configuration read from a TOML file on disk.
#[derive(Debug, Clone)]
pub struct FileFactory {
    path: PathBuf,
}

impl FileFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigFactory for FileFactory {
    fn origin(&self) -> &Path {
        &self.path
    }

    fn produce(self: Box<Self>) -> Result<RawConfig> {
        let contents = fs::read_to_string(&self.path).map_err(|e| BuildError::ConfigLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        parse(&contents, &self.path)
    }
}

/// The configuration compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct BundledDefault;

impl ConfigFactory for BundledDefault {
    fn origin(&self) -> &Path {
        Path::new("<bundled default>")
    }

    fn produce(self: Box<Self>) -> Result<RawConfig> {
        parse(BUNDLED_DEFAULT, self.origin())
    }
}

fn parse(contents: &str, origin: &Path) -> Result<RawConfig> {
    toml::from_str(contents).map_err(|e| BuildError::ConfigLoad {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Pick the configuration source for a project.
///
/// - An explicit path always wins (and must exist).
/// - Otherwise `<root>/assetline.toml` is used when present.
/// - Otherwise the bundled default.
pub fn locate(root: &Path, explicit: Option<&Path>) -> Box<dyn ConfigFactory> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        return Box::new(FileFactory::new(path));
    }

    let candidate = root.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        debug!(path = ?candidate, "found project configuration");
        Box::new(FileFactory::new(candidate))
    } else {
        debug!(root = ?root, "no project configuration; using bundled default");
        Box::new(BundledDefault)
    }
}

/// Evaluate a factory once and normalise the result.
pub fn load_from_factory(factory: Box<dyn ConfigFactory>) -> Result<ConfigurationTable> {
    let origin = factory.origin().to_path_buf();
    let raw = factory.produce()?;
    let table = normalize(raw, &origin)?;
    info!(
        origin = ?origin,
        tasks = table.tasks().len(),
        "configuration loaded"
    );
    Ok(table)
}

/// Load the configuration for `root`, falling back to the bundled default.
pub fn load(root: &Path) -> Result<ConfigurationTable> {
    load_from_factory(locate(root, None))
}
