use std::fs::read_to_string;
use std::path::Path;
use std::process::{Command, Output};

use crate::common;

/// Run the `tinybatt` binary from `cwd` with `args`.
fn tinybatt(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tinybatt"))
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_lint_when_valid_catalog_expect_exit_zero() {
    let td = common::initialize_workspace();
    let catalog = common::get_catalog_path(common::VALID_CATALOG);
    let output = tinybatt(td.path(), &["lint", catalog.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("7 entries, 0 errors, 0 warnings"));
}

#[test]
fn test_lint_when_broken_catalog_expect_exit_one() {
    let td = common::initialize_workspace();
    let catalog = common::get_catalog_path(common::BROKEN_CATALOG);
    let output = tinybatt(td.path(), &["lint", catalog.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let actual = stdout(&output);
    let expected = "error[duplicate-url]";
    assert!(actual.contains(expected), "\"{actual}\" doesn't contain {expected}");
}

#[test]
fn test_lint_when_catalog_missing_expect_exit_two() {
    let td = common::initialize_workspace();
    let output = tinybatt(td.path(), &["lint", "no-such-catalog.md"]);
    assert_eq!(output.status.code(), Some(2));
    let actual = String::from_utf8_lossy(&output.stderr);
    let expected = "Couldn't read catalog";
    assert_eq!(actual.matches(expected).count(), 1, "{actual}");
}

#[test]
fn test_lint_when_workspace_path_missing_expect_exit_two() {
    let td = common::initialize_workspace();
    let catalog = common::get_catalog_path(common::VALID_CATALOG);
    let output = tinybatt(
        td.path(),
        &["-w", "no-such-dir", "lint", catalog.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_features_prints_feature_to_column_lines() {
    let td = common::initialize_workspace();
    let dataset = common::get_dataset_path("cells.csv");
    let output = tinybatt(td.path(), &["features", dataset.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(
        lines,
        vec![
            "capacity -> Discharge_Capacity_Ah",
            "voltage -> Voltage_V",
            "current -> Current_A",
            "temperature -> Temperature_C",
            "charge_time -> Charge_Time_s",
            "missing: discharge_time",
        ]
    );
}

#[test]
fn test_map_with_explicit_mapping_writes_output_file() {
    let td = common::initialize_workspace();
    let dataset = common::get_dataset_path("cells.csv");
    let out_path = td.path().join("voltage.csv");
    let output = tinybatt(
        td.path(),
        &[
            "map",
            dataset.to_str().unwrap(),
            "-m",
            "voltage=Voltage_V",
            "-s",
            "drop",
            "-o",
            out_path.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        read_to_string(&out_path).unwrap(),
        "voltage\n4.19\n4.17\n4.15\n"
    );
}

#[test]
fn test_map_without_output_writes_csv_to_stdout() {
    let td = common::initialize_workspace();
    let dataset = common::get_dataset_path("cells.csv");
    let output = tinybatt(
        td.path(),
        &[
            "map",
            dataset.to_str().unwrap(),
            "--map",
            "voltage=Voltage_V",
            "--strategy",
            "forward_fill",
        ],
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "voltage\n4.19\n4.17\n4.15\n4.15\n");
}
