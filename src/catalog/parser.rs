//! Markdown parser for the catalog document.
//!
//! The catalog is a flat document: a `# Title`, a short introduction and a
//! list of `N. [Project](url)` items. The parser is line based and lenient;
//! anything it cannot classify is skipped, and list items that carry no link
//! are still recorded (with an empty URL) so the linter can flag them.
//!
//! Link destinations follow CommonMark: balanced parentheses inside the URL,
//! `<url>` in angle brackets, and an optional title after the URL. Text
//! before the link, as in `**Project** - [repo](url)`, names the entry.

#![allow(clippy::expect_used)]

use super::{Catalog, Entry};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEADING: Regex =
        Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)\s*#*\s*$").expect("Failed to compile regex!?!");
    static ref ORDERED_ITEM: Regex =
        Regex::new(r"^\s*(\d+)[.)]\s+(.*)$").expect("Failed to compile regex!?!");
    static ref BULLET_ITEM: Regex =
        Regex::new(r"^\s*[-*+]\s+(.*)$").expect("Failed to compile regex!?!");
    static ref BARE_URL: Regex =
        Regex::new(r"^(?:(.*?)\s*[-:]\s+)?([A-Za-z][A-Za-z0-9+.-]*://\S+)$")
            .expect("Failed to compile regex!?!");
}

/// Parse the catalog document.
#[must_use]
pub fn parse(text: &str) -> Catalog {
    let mut catalog = Catalog::default();
    let mut in_fence = false;
    let mut intro: Vec<&str> = Vec::new();
    let mut intro_done = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(caps) = HEADING.captures(raw_line) {
            if caps[1].len() == 1 && catalog.title.is_none() {
                catalog.title = Some(caps[2].trim().to_owned()).filter(|t| !t.is_empty());
            }
            intro_done |= !intro.is_empty();
            continue;
        }

        if let Some(entry) = parse_entry(raw_line, line_no, catalog.entries.len()) {
            catalog.entries.push(entry);
            intro_done = true;
            continue;
        }

        if trimmed.is_empty() {
            intro_done |= !intro.is_empty();
            continue;
        }

        if !intro_done && catalog.entries.is_empty() && !is_bullet(trimmed) {
            intro.push(trimmed);
        }
    }

    if !intro.is_empty() {
        catalog.intro = Some(intro.join(" "));
    }
    catalog
}

/// Turn an ordered or bullet list item into an entry.
///
/// Ordered items always become entries, with an empty URL when they carry
/// neither a link nor a bare URL. Bullets only count when they carry a link.
fn parse_entry(line: &str, line_no: usize, seen: usize) -> Option<Entry> {
    let (number, body) = if let Some(caps) = ORDERED_ITEM.captures(line) {
        (Some(parse_number(&caps[1])), caps.get(2).map_or("", |m| m.as_str()))
    } else if let Some(caps) = BULLET_ITEM.captures(line) {
        (None, caps.get(1).map_or("", |m| m.as_str()))
    } else {
        return None;
    };
    let body = body.trim();
    let entry = |name: &str, url: &str, description: Option<String>| Entry {
        number: number.unwrap_or_else(|| u32::try_from(seen + 1).unwrap_or(u32::MAX)),
        name: name.to_owned(),
        url: url.to_owned(),
        description,
        line: line_no,
    };

    if let Some(link) = find_link(body) {
        let lead = strip_decoration(&body[..link.start]);
        let name = if lead.is_empty() {
            strip_decoration(link.text)
        } else {
            lead
        };
        let rest = strip_decoration(&body[link.end..]);
        let description = Some(rest.to_owned()).filter(|text| !text.is_empty());
        return Some(entry(name, link.url, description));
    }
    if number.is_none() {
        return None;
    }
    if let Some(caps) = BARE_URL.captures(body) {
        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        return Some(entry(name, &caps[2], None));
    }
    Some(entry(body, "", None))
}

/// An inline `[text](destination)` link found in a list item.
struct Link<'a> {
    /// Byte offset of the opening `[`.
    start: usize,
    /// Byte offset just past the closing `)`.
    end: usize,
    text: &'a str,
    url: &'a str,
}

/// The first inline link in `body`.
fn find_link(body: &str) -> Option<Link<'_>> {
    let mut from = 0;
    while let Some(offset) = body[from..].find('[') {
        let start = from + offset;
        if let Some(link) = link_at(body, start) {
            return Some(link);
        }
        from = start + 1;
    }
    None
}

/// Parse a link whose `[` sits at `start`. Brackets in the text nest.
fn link_at(body: &str, start: usize) -> Option<Link<'_>> {
    let bytes = body.as_bytes();
    let mut depth = 0_usize;
    let mut close = None;
    for (idx, &byte) in bytes.iter().enumerate().skip(start) {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }
    let (url, end) = destination(body, close + 2)?;
    Some(Link {
        start,
        end,
        text: &body[start + 1..close],
        url,
    })
}

/// Parse a link destination starting just after its `(`: either `<url>` or
/// a URL with balanced parentheses, then an optional `"title"`, `'title'`
/// or `(title)`, then the closing `)`. Returns the URL and the offset past
/// the closing `)`.
fn destination(body: &str, open: usize) -> Option<(&str, usize)> {
    let bytes = body.as_bytes();
    let mut pos = skip_spaces(bytes, open);
    let url = if bytes.get(pos) == Some(&b'<') {
        let close = pos + 1 + body[pos + 1..].find('>')?;
        let url = &body[pos + 1..close];
        pos = close + 1;
        url
    } else {
        let url_start = pos;
        let mut depth = 0_usize;
        while let Some(&byte) = bytes.get(pos) {
            match byte {
                b'(' => depth += 1,
                b')' if depth == 0 => break,
                b')' => depth -= 1,
                _ if byte.is_ascii_whitespace() => break,
                _ => {}
            }
            pos += 1;
        }
        &body[url_start..pos]
    };

    pos = skip_spaces(bytes, pos);
    if let Some(&quote) = bytes.get(pos) {
        let closing = match quote {
            b'"' | b'\'' => Some(quote),
            b'(' => Some(b')'),
            _ => None,
        };
        if let Some(closing) = closing {
            let len = bytes[pos + 1..].iter().position(|&byte| byte == closing)?;
            pos = skip_spaces(bytes, pos + len + 2);
        }
    }
    (bytes.get(pos) == Some(&b')')).then_some((url.trim(), pos + 1))
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

/// Drop emphasis markers and the `-`/`:` separators around a name or description.
fn strip_decoration(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '-' | ':' | '|'))
}

/// List numbers that don't fit a `u32` become 0, which never matches a position.
fn parse_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

fn is_bullet(trimmed: &str) -> bool {
    trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with("+ ")
}
