// src/config/mod.rs

//! Configuration loading and normalisation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and evaluate the project or bundled configuration (`loader.rs`).
//! - Normalise raw tasks and check per-handler requirements (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    BundledDefault, ConfigFactory, FileFactory, CONFIG_FILE_NAME, load, load_from_factory,
    locate,
};
pub use model::{
    ConfigurationTable, RawConfig, RawDescriptor, ResolvedDescriptor, TaskDescriptor, TaskEntry,
};
pub use validate::normalize;
