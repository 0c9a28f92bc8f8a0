use tinybatt::utils::workspace::find_workspace_path;

use crate::common;

#[test]
fn test_find_workspace_path_when_at_workspace_expect_path() {
    let td = common::initialize_workspace();
    let expected = td.path().canonicalize().unwrap();
    let actual = find_workspace_path(td.path()).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_find_workspace_path_when_in_workspace_expect_workspace_path() {
    let workspace_path = common::get_test_workspace_path();
    let cwd = workspace_path.join("docs");
    let actual = find_workspace_path(&cwd).unwrap();
    let expected = workspace_path.canonicalize().unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn test_find_workspace_path_when_nonexistant_path_expect_error() {
    let cwd = common::get_test_workspace_path().join("does_not_exist");
    let actual = find_workspace_path(&cwd).unwrap_err();
    let expected = "(os error 2)";
    assert!(
        actual.to_string().contains(expected),
        "\"{actual}\" doesn't contain {expected}"
    );
}

#[test]
fn test_find_workspace_path_when_not_in_workspace_expect_error() {
    let td = tempfile::tempdir().unwrap();
    let actual = find_workspace_path(td.path()).unwrap_err();
    let expected = "is not inside a tinybatt workspace.";
    assert!(
        actual.to_string().contains(expected),
        "\"{actual}\" doesn't contain {expected}"
    );
}
