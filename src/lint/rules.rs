//! The individual catalog checks and their severities.

use serde_derive::Serialize;
use std::fmt;

/// How serious a finding is. Only errors fail a lint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The catalog breaks a required property.
    Error,
    /// The catalog is usable but incomplete.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Catalog checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// An entry has no project name.
    EmptyName,
    /// An entry's URL is missing, unparseable, has no host or uses a
    /// scheme outside the allowed list.
    InvalidUrl,
    /// Two entries point to the same URL.
    DuplicateUrl,
    /// The list doesn't have the expected number of entries.
    EntryCount,
    /// Ordered list numbers don't run 1..N.
    Numbering,
    /// The document has no title heading.
    MissingTitle,
}

impl Rule {
    /// Every rule, in the order they are documented.
    pub const ALL: [Self; 6] = [
        Self::EmptyName,
        Self::InvalidUrl,
        Self::DuplicateUrl,
        Self::EntryCount,
        Self::Numbering,
        Self::MissingTitle,
    ];

    /// The kebab-case identifier used in reports.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::EmptyName => "empty-name",
            Self::InvalidUrl => "invalid-url",
            Self::DuplicateUrl => "duplicate-url",
            Self::EntryCount => "entry-count",
            Self::Numbering => "numbering",
            Self::MissingTitle => "missing-title",
        }
    }

    /// Severity assigned to findings of this rule.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::MissingTitle => Severity::Warning,
            Self::EmptyName
            | Self::InvalidUrl
            | Self::DuplicateUrl
            | Self::EntryCount
            | Self::Numbering => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
