use tinybatt::catalog;
use tinybatt::config::LintConfig;
use tinybatt::lint::{self, Rule};

use crate::common::{self, BROKEN_CATALOG, VALID_CATALOG};

#[test]
fn test_load_when_valid_catalog_expect_seven_entries() {
    let catalog = catalog::load(&common::get_catalog_path(VALID_CATALOG)).unwrap();
    assert_eq!(
        catalog.title.as_deref(),
        Some("TinyML Battery State Estimation")
    );
    assert!(catalog.intro.is_some());
    assert_eq!(catalog.len(), 7);
    let soh = catalog.find("soh net").unwrap();
    assert_eq!(soh.url, "https://example.org/projects/soh-net");
    assert_eq!(soh.description.as_deref(), Some("SoH regression on Cortex-M4"));
}

#[test]
fn test_lint_when_valid_catalog_expect_clean_report() {
    let catalog = catalog::load(&common::get_catalog_path(VALID_CATALOG)).unwrap();
    let report = lint::check(&catalog, &LintConfig::default());
    assert!(report.is_clean());
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.entries, 7);
}

#[test]
fn test_lint_when_broken_catalog_expect_every_rule() {
    let catalog = catalog::load(&common::get_catalog_path(BROKEN_CATALOG)).unwrap();
    let report = lint::check(&catalog, &LintConfig::default());
    assert!(!report.is_clean());

    let entries_for = |rule: Rule| -> Vec<Option<u32>> {
        report.by_rule(rule).map(|finding| finding.entry).collect()
    };
    assert_eq!(entries_for(Rule::MissingTitle), vec![None]);
    assert_eq!(entries_for(Rule::EmptyName), vec![Some(2)]);
    assert_eq!(entries_for(Rule::InvalidUrl), vec![Some(3), Some(6)]);
    assert_eq!(entries_for(Rule::DuplicateUrl), vec![Some(5)]);
    assert_eq!(entries_for(Rule::Numbering), vec![Some(5), Some(6)]);
    assert_eq!(entries_for(Rule::EntryCount), vec![None]);
    assert_eq!(report.errors().count(), 7);
    assert_eq!(report.warnings().count(), 1);
}

#[test]
fn test_lint_report_serializes_rule_ids() {
    let catalog = catalog::load(&common::get_catalog_path(BROKEN_CATALOG)).unwrap();
    let report = lint::check(&catalog, &LintConfig::default());
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entries"], 5);
    assert_eq!(json["findings"][0]["rule"], "missing-title");
    assert_eq!(json["findings"][0]["severity"], "warning");
}

#[test]
fn test_load_when_nonexistent_file_expect_error() {
    let path = common::get_catalog_path("does_not_exist.md");
    let actual = catalog::load(&path).unwrap_err();
    let expected = "(os error 2)";
    assert!(
        actual.to_string().contains(expected),
        "\"{actual}\" doesn't contain {expected}"
    );
}
