//! Splitting a deck body into slides.
//!
//! Slides are separated by a line that is exactly `---` (trailing
//! whitespace allowed) with a line break on both sides. The rule is
//! applied literally, so a horizontal rule written as `---` inside a
//! slide also starts a new slide.

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use crate::types::{SlideBlock, SlideId};

/// Leading `<!-- slide-comment: ... -->` marker plus one following line break.
static COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^<!--\s*slide-comment:(.*?)-->(?:\r?\n)?").unwrap());

/// Split a body (text after the frontmatter) into slides.
///
/// Always returns at least one slide. Slides receive positional ids
/// (`slide-0`, `slide-1`, ...).
pub fn split(body: &str) -> Vec<SlideBlock> {
    let slides: Vec<SlideBlock> = split_chunks(body)
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| parse_chunk(SlideId::positional(index), chunk))
        .collect();

    debug!(
        "Split body into {} slides ({} with notes)",
        slides.len(),
        slides.iter().filter(|s| s.has_comment()).count()
    );

    slides
}

/// Parse one slide chunk, pulling out a leading presenter-note comment.
pub fn parse_chunk(id: SlideId, chunk: &str) -> SlideBlock {
    let chunk = trim_blank_lines(chunk);

    match COMMENT_REGEX.captures(chunk) {
        Some(caps) => {
            let marker_end = caps.get(0).map_or(0, |m| m.end());
            SlideBlock {
                id,
                content: chunk[marker_end..].to_string(),
                comment: caps[1].trim().to_string(),
            }
        }
        None => SlideBlock::new(id, chunk),
    }
}

/// Cut the body at separator lines. Returns `k + 1` chunks for `k` separators.
fn split_chunks(body: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut line_start = 0;

    while let Some(offset) = body[line_start..].find('\n') {
        let line_end = line_start + offset;
        if line_start > 0 && is_separator(&body[line_start..line_end]) {
            let chunk_end = if line_start > chunk_start {
                line_start - 1
            } else {
                chunk_start
            };
            chunks.push(&body[chunk_start..chunk_end]);
            chunk_start = line_end + 1;
        }
        line_start = line_end + 1;
    }
    chunks.push(&body[chunk_start..]);

    chunks
}

fn is_separator(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Drop leading whitespace-only lines and trailing whitespace.
fn trim_blank_lines(chunk: &str) -> &str {
    let mut rest = chunk;
    while let Some(pos) = rest.find('\n') {
        if !rest[..pos].trim().is_empty() {
            break;
        }
        rest = &rest[pos + 1..];
    }
    rest.trim_end()
}
