//! Frontmatter header codec.
//!
//! Reads and writes the `---`-delimited metadata block at the top of a
//! deck. Only a small YAML-like subset is understood: `key: value` lines
//! and `key: |` block scalars continued by indented lines, with optional
//! indentation digit and `+`/`-` chomping. Keys that are not plain words
//! are written as JSON strings. Anything else inside the block is skipped
//! rather than rejected.

use log::{debug, trace, warn};
use regex::Regex;
use std::sync::LazyLock;

use crate::types::Frontmatter;

/// Keys written first, in this order, ahead of all other fields.
pub const PREFERRED_KEY_ORDER: [&str; 5] = ["marp", "title", "theme", "paginate", "footer"];

/// Value written for `marp` when the map does not carry one.
pub const DEFAULT_MARP: &str = "true";

/// Delimiter line that opens and closes the header.
const DELIMITER: &str = "---";

/// Indentation used for block scalar continuation lines.
const BLOCK_INDENT: &str = "  ";

/// `key: rest` with a plain key. Keys may not start with whitespace, `#` or `"`.
static PLAIN_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([^\s:#"][^:]*?)\s*:(.*)$"#).unwrap());

/// `"key": rest` with a JSON-escaped key.
static QUOTED_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^("(?:[^"\\]|\\.)*")\s*:(.*)$"#).unwrap());

/// Block scalar indicator: `|` with an optional indentation digit and
/// chomping mark in either order (`|2`, `|+`, `|2+`, `|-2`).
static BLOCK_INDICATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(?:([1-9])([-+])?|([-+])([1-9])?)?$").unwrap());

/// Result of splitting raw text into header fields and the remaining body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrontmatter<'a> {
    /// Header fields, empty when the text has no header.
    pub frontmatter: Frontmatter,

    /// Everything after the closing delimiter.
    pub body: &'a str,
}

/// Split `raw` into frontmatter fields and body.
///
/// Never fails. Text that does not start with a `---` line has no header
/// and is returned whole as the body. A header with no closing delimiter
/// consumes the rest of the input.
pub fn parse(raw: &str) -> ParsedFrontmatter<'_> {
    let (first, mut rest) = split_line(raw);
    if !is_delimiter(first) {
        return ParsedFrontmatter {
            frontmatter: Frontmatter::new(),
            body: raw,
        };
    }

    let mut header = Vec::new();
    let body = loop {
        if rest.is_empty() {
            warn!("Frontmatter block is not terminated, consuming to end of input");
            break "";
        }
        let (line, next) = split_line(rest);
        if is_delimiter(line) {
            break strip_one_newline(next);
        }
        header.push(line);
        rest = next;
    };

    let frontmatter = parse_fields(&header);
    debug!(
        "Parsed frontmatter: {} fields from {} lines",
        frontmatter.len(),
        header.len()
    );

    ParsedFrontmatter { frontmatter, body }
}

/// Serialize fields into a `---`-delimited header block (no trailing newline).
///
/// Preferred keys come first in a fixed order, then the rest in map order.
/// `marp` is always written.
pub fn serialize(frontmatter: &Frontmatter) -> String {
    let mut lines = Vec::with_capacity(frontmatter.len() + 1);

    write_field(
        &mut lines,
        "marp",
        frontmatter.get("marp").unwrap_or(DEFAULT_MARP),
    );
    for key in &PREFERRED_KEY_ORDER[1..] {
        if let Some(value) = frontmatter.get(key) {
            write_field(&mut lines, key, value);
        }
    }
    for (key, value) in frontmatter.iter() {
        if !PREFERRED_KEY_ORDER.contains(&key) {
            write_field(&mut lines, key, value);
        }
    }

    format!("{DELIMITER}\n{}\n{DELIMITER}", lines.join("\n"))
}

/// Interpret header lines as fields. Later duplicates overwrite earlier ones.
fn parse_fields(lines: &[&str]) -> Frontmatter {
    let mut frontmatter = Frontmatter::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        let Some((key, rest)) = split_key(line) else {
            if !line.trim().is_empty() {
                trace!("Skipping unparsable frontmatter line: {:?}", line);
            }
            continue;
        };

        if let Some(indicator) = BLOCK_INDICATOR_REGEX.captures(rest.trim()) {
            let indent = indicator
                .get(1)
                .or_else(|| indicator.get(4))
                .and_then(|m| m.as_str().parse::<usize>().ok());
            let keep = indicator
                .get(2)
                .or_else(|| indicator.get(3))
                .is_some_and(|m| m.as_str() == "+");

            let start = i;
            while i < lines.len() && is_continuation(lines[i]) {
                i += 1;
            }
            trace!("Block scalar {:?} spans {} lines", key, i - start);
            frontmatter.insert(key, block_value(&lines[start..i], indent, keep));
        } else {
            frontmatter.insert(key, unquote(rest.trim()));
        }
    }

    frontmatter
}

/// Split a header line into its key and the text after the colon.
fn split_key(line: &str) -> Option<(String, &str)> {
    if let Some(caps) = QUOTED_KEY_REGEX.captures(line) {
        let key = serde_json::from_str::<String>(caps.get(1)?.as_str()).ok()?;
        return Some((key, caps.get(2)?.as_str()));
    }
    let caps = PLAIN_KEY_REGEX.captures(line)?;
    Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str()))
}

/// Keys that read back unchanged without quoting.
fn is_plain_key(key: &str) -> bool {
    match key.chars().next() {
        None => false,
        Some(first) => {
            !(first.is_whitespace() || matches!(first, '#' | '"'))
                && !key.contains([':', '\n', '\r'])
                && key == key.trim_end()
        }
    }
}

fn format_key(key: &str) -> String {
    if is_plain_key(key) {
        key.to_string()
    } else {
        serde_json::to_string(key).unwrap_or_else(|_| format!("{key:?}"))
    }
}

fn write_field(lines: &mut Vec<String>, key: &str, value: &str) {
    let key = format_key(key);
    if value.contains('\n') {
        write_block(lines, &key, value);
    } else if value.is_empty() {
        lines.push(format!("{key}:"));
    } else if needs_quotes(value) {
        lines.push(format!("{key}: \"{value}\""));
    } else {
        lines.push(format!("{key}: {value}"));
    }
}

/// Write a multi-line value as a block scalar.
///
/// A trailing newline is kept with `|+`. An explicit indentation digit is
/// written when no content line starts at column zero, since the reader
/// would otherwise strip the value's own indentation.
fn write_block(lines: &mut Vec<String>, key: &str, value: &str) {
    let (body, keep) = match value.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (value, false),
    };
    let explicit = body
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .map(leading_whitespace)
        .min()
        .map_or(true, |indent| indent > 0);

    let mut header = format!("{key}: |");
    if explicit {
        header.push_str(&BLOCK_INDENT.len().to_string());
    }
    if keep {
        header.push('+');
    }
    lines.push(header);

    for line in body.split('\n') {
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{BLOCK_INDENT}{line}"));
        }
    }
}

/// Whether a single-line value would be altered by trimming, quote stripping,
/// or block scalar detection when read back.
fn needs_quotes(value: &str) -> bool {
    value != value.trim() || is_quoted(value) || BLOCK_INDICATOR_REGEX.is_match(value)
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

fn unquote(value: &str) -> &str {
    if is_quoted(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Blank or indented lines continue a block scalar.
fn is_continuation(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with([' ', '\t'])
}

/// Assemble a block scalar from its continuation lines.
///
/// Without an explicit `indent`, the smallest indentation of the lines
/// with content is removed. Whitespace-only lines keep whatever is left
/// after the indentation. Trailing empty lines are dropped unless `keep`,
/// which also restores the final line break.
fn block_value(lines: &[&str], indent: Option<usize>, keep: bool) -> String {
    let indent = indent.unwrap_or_else(|| {
        lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| leading_whitespace(l))
            .min()
            .unwrap_or(0)
    });

    let mut out: Vec<&str> = lines
        .iter()
        .map(|l| &l[leading_whitespace(l).min(indent)..])
        .collect();

    if keep {
        let mut value = out.join("\n");
        value.push('\n');
        return value;
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Count of leading spaces and tabs.
fn leading_whitespace(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Split off the first line, returning it without its terminator and the rest.
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(pos) => (text[..pos].trim_end_matches('\r'), &text[pos + 1..]),
        None => (text, ""),
    }
}

fn strip_one_newline(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}
