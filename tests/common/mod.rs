use std::fs::create_dir_all;
use std::path::PathBuf;
use tempfile::{Builder, TempDir};
use tinybatt::utils::workspace::WORKSPACE_DIR;

pub const VALID_CATALOG: &str = "valid.md";
pub const BROKEN_CATALOG: &str = "broken.md";

pub fn get_fixtures_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path
}

pub fn get_catalog_path(name: &str) -> PathBuf {
    get_fixtures_path().join("catalog").join(name)
}

pub fn get_dataset_path(name: &str) -> PathBuf {
    get_fixtures_path().join("datasets").join(name)
}

pub fn get_test_workspace_path() -> PathBuf {
    get_fixtures_path().join("workspace")
}

/// A scratch workspace with an empty `.tinybatt` folder.
pub fn initialize_workspace() -> TempDir {
    let td = Builder::new().prefix("tinybatt").tempdir().unwrap();
    create_dir_all(td.path().join(WORKSPACE_DIR)).unwrap();
    td
}
