#![allow(dead_code)]

use assetline::config::{ConfigurationTable, TaskDescriptor, TaskEntry};
use assetline::paths::Patterns;
use assetline::types::{DevServerKind, TaskName};

/// Builder for `ConfigurationTable` to simplify test setup.
///
/// Tasks keep the order they were added in, like a parsed config file.
pub struct TableBuilder {
    dest: String,
    dev_server: DevServerKind,
    browserslist: Option<String>,
    tasks: Vec<(TaskName, TaskEntry)>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            dest: "dist".to_string(),
            dev_server: DevServerKind::None,
            browserslist: None,
            tasks: Vec::new(),
        }
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.dest = dest.to_string();
        self
    }

    pub fn dev_server(mut self, kind: DevServerKind) -> Self {
        self.dev_server = kind;
        self
    }

    pub fn browserslist(mut self, targets: &str) -> Self {
        self.browserslist = Some(targets.to_string());
        self
    }

    /// Add a single-descriptor task named after the descriptor.
    pub fn with_task(mut self, descriptor: TaskDescriptor) -> Self {
        let name = descriptor.name.clone();
        self.tasks.push((name, TaskEntry::One(descriptor)));
        self
    }

    /// Add a fan-out task: one dispatch per descriptor, in order.
    pub fn with_fan_out(mut self, name: &str, descriptors: Vec<TaskDescriptor>) -> Self {
        self.tasks.push((name.to_string(), TaskEntry::Many(descriptors)));
        self
    }

    pub fn build(self) -> ConfigurationTable {
        ConfigurationTable::new_unchecked(self.dest, self.dev_server, self.browserslist, self.tasks)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskDescriptor`.
pub struct DescriptorBuilder {
    descriptor: TaskDescriptor,
}

impl DescriptorBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            descriptor: TaskDescriptor::new(name),
        }
    }

    pub fn watch_on(mut self, patterns: impl Into<Patterns>) -> Self {
        self.descriptor.watch_on = Some(patterns.into());
        self
    }

    pub fn entry(mut self, patterns: impl Into<Patterns>) -> Self {
        self.descriptor.entry = Some(patterns.into());
        self
    }

    pub fn dest(mut self, dest: &str) -> Self {
        self.descriptor.dest = Some(dest.to_string());
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.descriptor.params.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> TaskDescriptor {
        self.descriptor
    }
}
