//! Recombining frontmatter and slides into deck text.

use log::debug;

use crate::frontmatter;
use crate::types::{Frontmatter, SlideBlock};

/// Literal text placed between two slides.
pub const SLIDE_SEPARATOR: &str = "\n\n---\n\n";

/// Content written for a slide whose content is empty.
pub const PLACEHOLDER_HEADING: &str = "# New Slide";

/// Fields every assembled deck carries, with the values used when absent.
pub const FRONTMATTER_DEFAULTS: [(&str, &str); 4] = [
    ("marp", "true"),
    ("title", "Untitled"),
    ("theme", "default"),
    ("paginate", "true"),
];

/// Serialize a deck into canonical text.
///
/// Missing default fields are filled in and empty slides receive a
/// placeholder heading. Parsing does not undo either normalization.
pub fn serialize(frontmatter: &Frontmatter, slides: &[SlideBlock]) -> String {
    let header = frontmatter::serialize(&with_defaults(frontmatter));
    let body = slides
        .iter()
        .map(render_slide)
        .collect::<Vec<_>>()
        .join(SLIDE_SEPARATOR);

    debug!("Assembled {} slides into {} bytes", slides.len(), header.len() + body.len() + 2);

    format!("{}\n\n{}", header, body)
}

/// Copy of `frontmatter` with every missing default field added.
pub fn with_defaults(frontmatter: &Frontmatter) -> Frontmatter {
    let mut filled = frontmatter.clone();
    for (key, value) in FRONTMATTER_DEFAULTS {
        filled.insert_default(key, value);
    }
    filled
}

/// Text of a single slide chunk, including its presenter-note marker.
pub fn render_slide(slide: &SlideBlock) -> String {
    let content = if slide.content.is_empty() {
        PLACEHOLDER_HEADING
    } else {
        slide.content.as_str()
    };

    if slide.has_comment() {
        format!("<!-- slide-comment:\n{}\n-->\n{}", slide.comment, content)
    } else {
        content.to_string()
    }
}
