// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::paths::{self, Patterns};
use crate::types::{DescriptorId, DevServerKind, TaskName};

/// Params whose values are paths and therefore get resolved with the rest
/// of the descriptor.
pub const PATH_PARAMS: &[&str] = &["root"];

fn default_dest() -> String {
    "dist".to_string()
}

/// Top-level configuration as read from `assetline.toml`.
///
/// ```toml
/// dest = "dist"
/// dev_server = "browsersync"
/// browserslist = "> 1%, ie 11"
///
/// [tasks.css]
/// watch_on = "source/css/**/*.css"
/// entry = ["source/css/index.css"]
/// dest = "dist/assets/css"
///
/// [[tasks.icons]]
/// watch_on = "source/icons/**/*.svg"
/// dest = "dist/assets"
/// file_name = "icons.svg"
/// ```
///
/// `tasks` is kept as a raw table so declaration order survives and each
/// entry can be either a table (one descriptor) or an array of tables
/// (fan-out).
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_dest")]
    pub dest: String,

    #[serde(default, alias = "devServer")]
    pub dev_server: DevServerKind,

    #[serde(default, alias = "browserlist")]
    pub browserslist: Option<String>,

    #[serde(default)]
    pub tasks: toml::Table,
}

/// One descriptor exactly as written in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDescriptor {
    #[serde(default, alias = "watchOn")]
    pub watch_on: Option<Patterns>,

    #[serde(default)]
    pub entry: Option<Patterns>,

    #[serde(default)]
    pub dest: Option<String>,

    #[serde(default)]
    pub params: toml::Table,

    /// Any other key (e.g. `fileName`, `iconId`); folded into `params`.
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A normalised unit of work: inputs, outputs and handler options.
///
/// All paths are still relative to the project root here; see
/// [`TaskDescriptor::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    pub name: TaskName,
    pub watch_on: Option<Patterns>,
    pub entry: Option<Patterns>,
    pub dest: Option<String>,
    pub params: toml::Table,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            watch_on: None,
            entry: None,
            dest: None,
            params: toml::Table::new(),
        }
    }

    /// Resolve every path field against `root`.
    ///
    /// This is the only way to obtain a [`ResolvedDescriptor`], so handlers
    /// can never observe a relative path.
    pub fn resolve(&self, root: &Path) -> ResolvedDescriptor {
        let mut params = self.params.clone();
        for key in PATH_PARAMS {
            let resolved = params
                .get(*key)
                .and_then(|v| v.as_str())
                .map(|p| paths::resolve(p, root));
            if let Some(resolved) = resolved {
                params.insert((*key).to_string(), toml::Value::String(resolved));
            }
        }

        ResolvedDescriptor {
            name: self.name.clone(),
            watch_on: self.watch_on.as_ref().map(|p| p.resolve(root).to_vec()),
            entry: self.entry.as_ref().map(|p| p.resolve(root).to_vec()),
            dest: self.dest.as_deref().map(|d| paths::resolve_path(d, root)),
            params,
        }
    }
}

/// A descriptor whose globs and paths are absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDescriptor {
    name: TaskName,
    watch_on: Option<Vec<String>>,
    entry: Option<Vec<String>>,
    dest: Option<PathBuf>,
    params: toml::Table,
}

impl ResolvedDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn watch_on(&self) -> Option<&[String]> {
        self.watch_on.as_deref()
    }

    pub fn entry(&self) -> Option<&[String]> {
        self.entry.as_deref()
    }

    pub fn dest(&self) -> Option<&Path> {
        self.dest.as_deref()
    }

    pub fn params(&self) -> &toml::Table {
        &self.params
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_str())
    }

    pub fn param_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(|v| v.as_bool())
    }
}

/// A task's declaration: one descriptor, or an ordered fan-out list.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEntry {
    One(TaskDescriptor),
    Many(Vec<TaskDescriptor>),
}

impl TaskEntry {
    /// Descriptors in declaration order (a scalar entry yields one).
    pub fn descriptors(&self) -> &[TaskDescriptor] {
        match self {
            TaskEntry::One(d) => std::slice::from_ref(d),
            TaskEntry::Many(list) => list,
        }
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self, TaskEntry::Many(_))
    }
}

/// The loaded, normalised configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationTable {
    dest: String,
    dev_server: DevServerKind,
    browserslist: Option<String>,
    tasks: Vec<(TaskName, TaskEntry)>,
}

impl ConfigurationTable {
    pub fn new_unchecked(
        dest: String,
        dev_server: DevServerKind,
        browserslist: Option<String>,
        tasks: Vec<(TaskName, TaskEntry)>,
    ) -> Self {
        Self {
            dest,
            dev_server,
            browserslist,
            tasks,
        }
    }

    /// Top-level output directory, relative to the project root.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn dev_server(&self) -> DevServerKind {
        self.dev_server
    }

    pub fn browserslist(&self) -> Option<&str> {
        self.browserslist.as_deref()
    }

    /// Task entries in declaration order.
    pub fn tasks(&self) -> &[(TaskName, TaskEntry)] {
        &self.tasks
    }

    pub fn get(&self, name: &str) -> Option<&TaskEntry> {
        self.tasks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Every descriptor with its identity, tasks in declaration order and
    /// fan-out lists in list order.
    pub fn descriptors(&self) -> impl Iterator<Item = (DescriptorId, &TaskDescriptor)> {
        self.tasks.iter().flat_map(|(name, entry)| {
            entry
                .descriptors()
                .iter()
                .enumerate()
                .map(move |(index, d)| (DescriptorId::new(name.clone(), index), d))
        })
    }

    /// Look up one descriptor by identity.
    pub fn descriptor(&self, id: &DescriptorId) -> Option<&TaskDescriptor> {
        self.get(&id.task)
            .and_then(|entry| entry.descriptors().get(id.index))
    }
}
