// tests/clean.rs

use std::fs;

use tempfile::TempDir;

use assetline::engine::clean;
use assetline::fs::RealFileSystem;
use assetline_test_utils::builders::TableBuilder;

#[test]
fn clean_removes_the_destination_tree() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("dist/assets/css")).unwrap();
    fs::write(root.join("dist/assets/css/index.css"), "body{}").unwrap();
    fs::create_dir_all(root.join("source")).unwrap();

    let table = TableBuilder::new().dest("dist").build();
    clean(&RealFileSystem, root, &table).unwrap();

    assert!(!root.join("dist").exists());
    assert!(root.join("source").exists());
}

#[test]
fn clean_without_destination_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let table = TableBuilder::new().dest("public").build();

    clean(&RealFileSystem, dir.path(), &table).unwrap();
    assert!(dir.path().exists());
}

#[test]
fn clean_refuses_the_project_root_itself() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("site");
    fs::create_dir_all(root.join("source")).unwrap();

    for dest in [".", "", "./"] {
        let table = TableBuilder::new().dest(dest).build();
        let err = clean(&RealFileSystem, &root, &table).unwrap_err();
        assert!(err.to_string().contains("not inside the project root"), "{err}");
    }
    assert!(root.join("source").exists());
}

#[test]
fn clean_refuses_paths_outside_the_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("site");
    let sibling = dir.path().join("other");
    fs::create_dir_all(root.join("source")).unwrap();
    fs::create_dir_all(&sibling).unwrap();

    for dest in ["..", "../other", "/"] {
        let table = TableBuilder::new().dest(dest).build();
        assert!(clean(&RealFileSystem, &root, &table).is_err(), "dest {dest:?} was accepted");
    }
    assert!(sibling.exists());
    assert!(root.join("source").exists());
}
