//! The catalog module contains the data model for the curated list of
//! TinyML battery state estimation projects, and the Markdown parser that
//! builds it from the published document.

pub mod parser;

pub use parser::parse;

use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs::read_to_string;
use std::path::Path;

/// A single project listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position of the entry in the list.
    ///
    /// For ordered lists this is the number written in the document, which
    /// is what the numbering check inspects. Bullet entries are numbered
    /// sequentially.
    pub number: u32,
    /// Project name, as written between the link brackets.
    pub name: String,
    /// Project URL, kept verbatim so malformed links can be reported.
    pub url: String,
    /// Optional free text following the link.
    pub description: Option<String>,
    /// 1-based line of the entry in the source document.
    pub line: usize,
}

/// The curated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Document title (first level-1 heading).
    pub title: Option<String>,
    /// Introductory paragraph between the title and the list.
    pub intro: Option<String>,
    /// Listed projects in document order.
    pub entries: Vec<Entry>,
}

impl Catalog {
    /// Number of listed projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog lists no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by project name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Entry> {
        let needle = name.trim();
        self.entries
            .iter()
            .find(|entry| entry.name.trim().eq_ignore_ascii_case(needle))
    }

    /// Render the catalog in its canonical Markdown form: title, intro, then
    /// a numbered list of `[Name](url)` links.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(title) = self.title.as_deref() {
            let _ = writeln!(out, "# {title}\n");
        }
        if let Some(intro) = self.intro.as_deref() {
            let _ = writeln!(out, "{intro}\n");
        }
        for (idx, entry) in self.entries.iter().enumerate() {
            let _ = write!(
                out,
                "{}. [{}]({})",
                idx + 1,
                entry.name,
                link_destination(&entry.url)
            );
            if let Some(description) = entry.description.as_deref() {
                let _ = write!(out, " - {description}");
            }
            out.push('\n');
        }
        out
    }
}

/// Wrap a URL in `<>` when it can't be written bare inside `(...)`.
fn link_destination(url: &str) -> Cow<'_, str> {
    let mut depth = 0_i32;
    let balanced = url.chars().all(|c| {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        depth >= 0
    }) && depth == 0;
    if balanced && !url.chars().any(char::is_whitespace) {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("<{url}>"))
    }
}

/// Read and parse the catalog document at `path`.
///
/// # Errors
/// Errors if the file cannot be read.
pub fn load(path: &Path) -> anyhow::Result<Catalog> {
    let text = read_to_string(path)
        .map_err(|err| anyhow::anyhow!("Couldn't read catalog {}: {err}", path.display()))?;
    let catalog = parse(&text);
    tracing::debug!(
        path = %path.display(),
        entries = catalog.len(),
        "Parsed catalog"
    );
    Ok(catalog)
}
