use std::fs::{create_dir_all, write};
use tinybatt::config::Config;
use tinybatt::dataset::MissingStrategy;
use tinybatt::utils::workspace::CONFIG_FILE;

use crate::common;

#[test]
fn test_discover_when_in_workspace_subdirectory_expect_workspace_config() {
    let cwd = common::get_test_workspace_path().join("docs");
    let config = Config::discover(&cwd).unwrap();
    assert_eq!(config.lint.expected_entries, 5);
    assert_eq!(config.dataset.strategy(), MissingStrategy::Drop);
    let mapper = config.dataset.feature_mapper().unwrap();
    assert!(mapper.standard_features().contains(&"soc".to_owned()));
}

#[test]
fn test_discover_when_workspace_without_config_expect_defaults() {
    let td = common::initialize_workspace();
    let config = Config::discover(td.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_discover_when_outside_workspace_expect_defaults() {
    let td = tempfile::Builder::new().tempdir().unwrap();
    let config = Config::discover(td.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_discover_when_path_does_not_exist_expect_error() {
    let td = common::initialize_workspace();
    let actual = Config::discover(&td.path().join("no-such-dir"))
        .unwrap_err()
        .to_string();
    let expected = "Couldn't resolve workspace path";
    assert!(actual.contains(expected), "\"{actual}\" doesn't contain {expected}");
    assert!(actual.contains("(os error 2)"), "\"{actual}\" doesn't contain (os error 2)");
}

#[test]
fn test_discover_when_config_malformed_expect_error() {
    let td = common::initialize_workspace();
    let config_path = td.path().join(CONFIG_FILE);
    create_dir_all(config_path.parent().unwrap()).unwrap();
    write(&config_path, "[lint]\nexpected_entries = \"seven\"\n").unwrap();
    assert!(Config::discover(td.path()).is_err());
}

#[test]
fn test_load_when_missing_file_expect_error() {
    let td = common::initialize_workspace();
    let actual = Config::load(&td.path().join("nope.toml")).unwrap_err();
    assert!(actual.to_string().contains("Couldn't read config"), "{actual}");
}
