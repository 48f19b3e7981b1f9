//! Domain types for representing an editable slide deck.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-process counter that disambiguates ids generated in the same millisecond.
static NEXT_GENERATED_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a slide.
///
/// Assigned once, when the slide is parsed or created, and never derived
/// from the slide's content. Identity survives edits and reordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    /// Identifier for the slide at `index` in freshly parsed text.
    pub fn positional(index: usize) -> Self {
        Self(format!("slide-{}", index))
    }

    /// Creation-time identifier for a slide added interactively.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = NEXT_GENERATED_ID.fetch_add(1, Ordering::Relaxed);
        Self(format!("slide-{}-{}", millis, seq))
    }

    /// Wrap an existing identifier, e.g. one restored from a draft.
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single slide: markdown content plus an optional presenter note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideBlock {
    /// Stable identity, independent of content.
    pub id: SlideId,

    /// Markdown content, without frontmatter or the comment marker.
    pub content: String,

    /// Presenter note; empty when the slide has none.
    pub comment: String,
}

impl SlideBlock {
    /// Create a slide with the given identity and content and no note.
    pub fn new(id: SlideId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            comment: String::new(),
        }
    }

    /// Create a slide with a freshly generated identity.
    pub fn created(content: impl Into<String>) -> Self {
        Self::new(SlideId::generate(), content)
    }

    /// Set the presenter note.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Copy of this slide under a new identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: SlideId::generate(),
            content: self.content.clone(),
            comment: self.comment.clone(),
        }
    }

    /// Whether a presenter note is attached.
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }

    /// First non-blank line of the content, used for summaries.
    pub fn headline(&self) -> Option<&str> {
        self.content.lines().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Insertion-ordered frontmatter fields.
///
/// Values may span several lines; those are written back as block scalars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(IndexMap<String, String>);

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Set a field only if it is not present yet.
    pub fn insert_default(&mut self, key: &str, value: &str) {
        if !self.0.contains_key(key) {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    /// Remove a field, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A parsed deck: frontmatter plus an ordered, never-empty slide list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Metadata header fields.
    pub frontmatter: Frontmatter,

    /// Slides in presentation order.
    pub slides: Vec<SlideBlock>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            frontmatter: Frontmatter::new(),
            slides: vec![SlideBlock::new(SlideId::positional(0), "")],
        }
    }
}

impl Document {
    /// Parse raw deck text into frontmatter and slides.
    pub fn parse(raw: &str) -> Self {
        let parsed = crate::frontmatter::parse(raw);
        Self {
            frontmatter: parsed.frontmatter,
            slides: crate::slides::split(parsed.body),
        }
    }

    /// Serialize back into canonical deck text.
    pub fn to_markdown(&self) -> String {
        crate::assemble::serialize(&self.frontmatter, &self.slides)
    }

    /// Look up a slide by identity.
    pub fn slide(&self, id: &SlideId) -> Option<&SlideBlock> {
        self.slides.iter().find(|s| &s.id == id)
    }

    /// Current position of a slide.
    pub fn position_of(&self, id: &SlideId) -> Option<usize> {
        self.slides.iter().position(|s| &s.id == id)
    }

    /// Presenter notes of all slides, in order. Slides without a note yield "".
    pub fn notes(&self) -> Vec<&str> {
        self.slides.iter().map(|s| s.comment.as_str()).collect()
    }
}
