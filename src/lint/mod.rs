//! Checks a parsed [`Catalog`] for the structural properties every published
//! list must hold: named entries, well formed and unique URLs, the expected
//! number of entries, and consistent numbering.

pub mod rules;

pub use rules::{Rule, Severity};

use crate::catalog::Catalog;
use crate::config::LintConfig;
use serde_derive::Serialize;
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// A single problem found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// The check that produced the finding.
    pub rule: Rule,
    /// How serious the finding is.
    pub severity: Severity,
    /// Number of the offending entry, if the finding is about one.
    pub entry: Option<u32>,
    /// Source line of the offending entry.
    pub line: Option<usize>,
    /// Human readable explanation.
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "{line}: ")?;
        }
        write!(f, "{}[{}]", self.severity, self.rule)?;
        if let Some(entry) = self.entry {
            write!(f, " entry {entry}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// The result of linting a catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    /// Number of entries that were checked.
    pub entries: usize,
    /// Everything that was found, in check order.
    pub findings: Vec<Finding>,
}

impl Report {
    /// `true` when no error-severity findings were produced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Error-severity findings.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
    }

    /// Warning-severity findings.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    /// Findings produced by `rule`.
    pub fn by_rule(&self, rule: Rule) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |finding| finding.rule == rule)
    }

    fn push(&mut self, rule: Rule, entry: Option<(u32, usize)>, message: String) {
        self.findings.push(Finding {
            rule,
            severity: rule.severity(),
            entry: entry.map(|(number, _)| number),
            line: entry.map(|(_, line)| line),
            message,
        });
    }
}

/// Run every check over `catalog`.
#[must_use]
#[tracing::instrument(skip_all, fields(entries = catalog.len()))]
pub fn check(catalog: &Catalog, config: &LintConfig) -> Report {
    let mut report = Report {
        entries: catalog.len(),
        findings: Vec::new(),
    };

    if catalog.title.is_none() {
        report.push(
            Rule::MissingTitle,
            None,
            "document has no `# Title` heading".to_owned(),
        );
    }

    let mut seen_urls: HashMap<String, u32> = HashMap::new();
    for (idx, entry) in catalog.entries.iter().enumerate() {
        let at = Some((entry.number, entry.line));

        if entry.name.trim().is_empty() {
            report.push(Rule::EmptyName, at, "project name is empty".to_owned());
        }

        match validate_url(&entry.url, &config.allowed_schemes) {
            Ok(normalized) => {
                if let Some(first) = seen_urls.get(&normalized) {
                    report.push(
                        Rule::DuplicateUrl,
                        at,
                        format!("`{}` is already listed by entry {first}", entry.url),
                    );
                } else {
                    seen_urls.insert(normalized, entry.number);
                }
            }
            Err(reason) => report.push(Rule::InvalidUrl, at, reason),
        }

        let position = idx + 1;
        if usize::try_from(entry.number).map_or(true, |number| number != position) {
            report.push(
                Rule::Numbering,
                at,
                format!("numbered {} but is item {position} of the list", entry.number),
            );
        }
    }

    if catalog.len() != config.expected_entries {
        report.push(
            Rule::EntryCount,
            None,
            format!(
                "expected {} entries, found {}",
                config.expected_entries,
                catalog.len()
            ),
        );
    }

    tracing::debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "Linted catalog"
    );
    report
}

/// Check that `raw` is an absolute URL with a host and an allowed scheme.
///
/// Returns the normalized form used for duplicate detection: the parsed URL
/// (which lowercases scheme and host) without a trailing `/`.
///
/// # Errors
/// Returns the reason the URL was rejected.
pub fn validate_url(raw: &str, allowed_schemes: &[String]) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("entry has no URL".to_owned());
    }
    let url = Url::parse(raw).map_err(|err| format!("`{raw}` is not a valid URL: {err}"))?;
    if !allowed_schemes
        .iter()
        .any(|scheme| scheme.eq_ignore_ascii_case(url.scheme()))
    {
        return Err(format!(
            "`{raw}` uses scheme `{}`, allowed: {}",
            url.scheme(),
            allowed_schemes.join(", ")
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("`{raw}` has no host"));
    }
    Ok(url.as_str().trim_end_matches('/').to_owned())
}
