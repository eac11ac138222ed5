// src/config/validate.rs

//! Normalisation of raw configuration and per-handler shape checks.
//!
//! Load time only checks what is needed to build the table at all (every task
//! is a table or an array of tables). Whether a descriptor carries the fields
//! its handler needs is checked lazily, at dispatch, so a half-written
//! experimental task does not stop the rest of the build.

use std::path::{Path, PathBuf};

use crate::config::model::{
    ConfigurationTable, RawConfig, RawDescriptor, ResolvedDescriptor, TaskDescriptor, TaskEntry,
};
use crate::errors::{BuildError, Result};

/// Turn a freshly parsed [`RawConfig`] into a [`ConfigurationTable`].
///
/// `origin` is only used for error messages.
pub fn normalize(raw: RawConfig, origin: &Path) -> Result<ConfigurationTable> {
    let mut tasks = Vec::with_capacity(raw.tasks.len());

    for (name, value) in raw.tasks {
        let entry = match value {
            toml::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let label = format!("{name}[{index}]");
                    list.push(descriptor_from_value(&name, &label, item, origin)?);
                }
                TaskEntry::Many(list)
            }
            table @ toml::Value::Table(_) => {
                TaskEntry::One(descriptor_from_value(&name, &name, table, origin)?)
            }
            other => {
                return Err(load_error(
                    origin,
                    format!(
                        "task '{name}' must be a table or an array of tables (got {})",
                        other.type_str()
                    ),
                ));
            }
        };
        tasks.push((name, entry));
    }

    Ok(ConfigurationTable::new_unchecked(
        raw.dest,
        raw.dev_server,
        raw.browserslist,
        tasks,
    ))
}

fn descriptor_from_value(
    name: &str,
    label: &str,
    value: toml::Value,
    origin: &Path,
) -> Result<TaskDescriptor> {
    if !value.is_table() {
        return Err(load_error(
            origin,
            format!("task '{label}' must be a table (got {})", value.type_str()),
        ));
    }

    let raw: RawDescriptor = value
        .try_into()
        .map_err(|e| load_error(origin, format!("task '{label}': {e}")))?;

    let mut params = toml::Table::new();
    for (key, v) in raw.params.into_iter().chain(raw.extra) {
        let key = snake_case(&key);
        if !params.contains_key(&key) {
            params.insert(key, v);
        }
    }

    Ok(TaskDescriptor {
        name: name.to_string(),
        watch_on: raw.watch_on,
        entry: raw.entry,
        dest: raw.dest,
        params,
    })
}

fn load_error(origin: &Path, reason: String) -> BuildError {
    BuildError::ConfigLoad {
        path: PathBuf::from(origin),
        reason,
    }
}

/// `iconId` -> `icon_id`; already snake_case keys pass through.
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

impl ResolvedDescriptor {
    pub fn require_watch_on(&self) -> Result<&[String]> {
        match self.watch_on() {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(BuildError::shape(self.name(), "watch_on")),
        }
    }

    pub fn require_entry(&self) -> Result<&[String]> {
        match self.entry() {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(BuildError::shape(self.name(), "entry")),
        }
    }

    pub fn require_dest(&self) -> Result<&Path> {
        self.dest()
            .ok_or_else(|| BuildError::shape(self.name(), "dest"))
    }

    /// `entry` if present, otherwise the watched set.
    pub fn entry_or_watch_on(&self) -> Result<&[String]> {
        match self.entry() {
            Some(list) if !list.is_empty() => Ok(list),
            _ => self.require_watch_on(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_keys_become_snake_case() {
        assert_eq!(snake_case("iconId"), "icon_id");
        assert_eq!(snake_case("fileName"), "file_name");
        assert_eq!(snake_case("maps_dir"), "maps_dir");
    }

    #[test]
    fn scalar_task_value_is_a_load_error() {
        let raw: RawConfig = toml::from_str("[tasks]\ncss = 3\n").unwrap();
        let err = normalize(raw, Path::new("assetline.toml")).unwrap_err();
        assert!(matches!(err, BuildError::ConfigLoad { .. }));
    }

    #[test]
    fn extra_keys_are_folded_into_params() {
        let raw: RawConfig = toml::from_str(
            r#"
[[tasks.icons]]
watchOn = "source/icons/**/*.svg"
dest = "dist/assets"
fileName = "icons.svg"
iconId = "icon-%s"
"#,
        )
        .unwrap();
        let table = normalize(raw, Path::new("assetline.toml")).unwrap();
        let icons = &table.get("icons").unwrap().descriptors()[0];
        assert_eq!(icons.params.get("file_name").and_then(|v| v.as_str()), Some("icons.svg"));
        assert_eq!(icons.params.get("icon_id").and_then(|v| v.as_str()), Some("icon-%s"));
        assert!(icons.watch_on.is_some());
    }
}
