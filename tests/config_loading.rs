// tests/config_loading.rs

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use assetline::config::{self, BundledDefault, ConfigFactory, CONFIG_FILE_NAME};
use assetline::errors::BuildError;
use assetline::types::{DescriptorId, DevServerKind};

#[test]
fn missing_project_config_falls_back_to_bundled_default() {
    let dir = TempDir::new().unwrap();

    let table = config::load(dir.path()).unwrap();

    assert_eq!(table.dest(), "dist");
    assert_eq!(table.dev_server(), DevServerKind::BrowserSync);
    let names: Vec<_> = table.tasks().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["html", "css", "javascript", "img", "static", "icons"]);
    assert!(table.get("javascript").unwrap().is_fan_out());

    let worker = table.descriptor(&DescriptorId::new("javascript", 1)).unwrap();
    assert_eq!(worker.params.get("use_fallback"), Some(&toml::Value::Boolean(false)));
}

#[test]
fn bundled_default_is_what_locate_picks() {
    let dir = TempDir::new().unwrap();
    let factory = config::locate(dir.path(), None);
    assert_eq!(factory.origin(), BundledDefault.origin());
}

#[test]
fn project_config_wins_and_keeps_declaration_order() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
dest = "public"
dev_server = "livereload"

[tasks.static]
watch_on = "assets/**/*"
dest = "public"

[tasks.css]
watch_on = "styles/**/*.css"
entry = "styles/main.css"
dest = "public/css"
outputStyle = "compressed"
"#,
    )
    .unwrap();

    let table = config::load(dir.path()).unwrap();

    assert_eq!(table.dest(), "public");
    assert_eq!(table.dev_server(), DevServerKind::LiveReload);
    let ids: Vec<_> = table.descriptors().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids, vec!["static[0]", "css[0]"]);

    let css = table.descriptor(&DescriptorId::new("css", 0)).unwrap();
    assert!(css.watch_on.is_some());
    assert_eq!(
        css.params.get("output_style").and_then(|v| v.as_str()),
        Some("compressed")
    );
}

#[test]
fn invalid_toml_is_a_fatal_load_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "dest = [unterminated").unwrap();

    let err = config::load(dir.path()).unwrap_err();

    assert!(matches!(err, BuildError::ConfigLoad { .. }), "{err}");
    assert!(err.is_fatal());
}

#[test]
fn task_that_is_not_a_table_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "[tasks]\ncss = 3\n").unwrap();

    let err = config::load(dir.path()).unwrap_err();
    assert!(matches!(err, BuildError::ConfigLoad { ref reason, .. } if reason.contains("css")));
}

#[test]
fn explicit_config_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let factory = config::locate(dir.path(), Some(Path::new("custom.toml")));

    assert_eq!(factory.origin(), dir.path().join("custom.toml"));
    let err = config::load_from_factory(factory).unwrap_err();
    assert!(matches!(err, BuildError::ConfigLoad { .. }));
}

#[test]
fn dev_server_spellings_and_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    for (text, expected) in [
        ("", DevServerKind::None),
        ("dev_server = \"null\"\n", DevServerKind::None),
        ("dev_server = \"browser-sync\"\n", DevServerKind::BrowserSync),
        ("devServer = \"livereload\"\n", DevServerKind::LiveReload),
    ] {
        fs::write(&path, text).unwrap();
        let table = config::load(dir.path()).unwrap();
        assert_eq!(table.dev_server(), expected, "config: {text:?}");
    }

    fs::write(&path, "dev_server = \"webpack\"\n").unwrap();
    assert!(matches!(config::load(dir.path()), Err(BuildError::ConfigLoad { .. })));
}
