//! Editing session over a single deck.
//!
//! Applies edit intents coming from the UI to the current document,
//! records them in an [`EditHistory`], and tracks whether the canonical
//! text has changed since it was last handed to the save collaborator.

use log::{debug, info};
use std::time::Instant;

use crate::draft::{self, DraftStore};
use crate::error::{Error, Result};
use crate::history::{EditHistory, HistoryAction, HistoryConfig, HistoryView};
use crate::types::{Document, SlideBlock, SlideId};

/// A single change requested by the editor UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    /// Replace a slide's markdown content.
    SetContent { id: SlideId, content: String },

    /// Replace a slide's presenter note.
    SetComment { id: SlideId, comment: String },

    /// Insert a new slide right after `after`.
    InsertAfter { after: SlideId, content: String },

    /// Append a new slide at the end.
    Append { content: String },

    /// Copy a slide under a new identity, right after the original.
    Duplicate { id: SlideId },

    /// Remove a slide. The last remaining slide cannot be removed.
    Delete { id: SlideId },

    /// Move the slide at `from` so it ends up at index `to`.
    Move { from: usize, to: usize },

    /// Set a frontmatter field.
    SetField { key: String, value: String },

    /// Remove a frontmatter field.
    RemoveField { key: String },
}

/// The document being edited, its history, and its save state.
#[derive(Debug, Clone)]
pub struct EditorSession {
    /// Identity of the open document (e.g. its storage key).
    key: String,

    history: EditHistory<Document>,

    /// Canonical text as of the last save.
    saved: String,
}

impl EditorSession {
    /// Open raw deck text under `key` with the default history settings.
    pub fn open(key: impl Into<String>, raw: &str) -> Self {
        Self::with_config(key, raw, HistoryConfig::default())
    }

    pub fn with_config(key: impl Into<String>, raw: &str, config: HistoryConfig) -> Self {
        Self::from_document(key, Document::parse(raw), config)
    }

    fn from_document(key: impl Into<String>, document: Document, config: HistoryConfig) -> Self {
        let saved = document.to_markdown();
        Self::with_baseline(key, document, saved, config)
    }

    /// Session whose last saved text is `saved`, which may differ from `document`.
    fn with_baseline(
        key: impl Into<String>,
        document: Document,
        saved: String,
        config: HistoryConfig,
    ) -> Self {
        Self {
            key: key.into(),
            history: EditHistory::with_config(document, config),
            saved,
        }
    }

    /// Load text for `key`.
    ///
    /// `raw` is the persisted text, so it becomes the saved baseline.
    /// Switching to a different document starts a fresh history so undo
    /// never crosses documents. Reloading the same document is recorded as
    /// an ordinary, undoable edit.
    pub fn load(&mut self, key: &str, raw: &str) {
        let document = Document::parse(raw);
        if key == self.key {
            debug!("Reloading document {}", key);
            self.saved = document.to_markdown();
            self.history.set(document);
        } else {
            info!("Switching document {} -> {}", self.key, key);
            self.key = key.to_string();
            self.saved = document.to_markdown();
            self.history.reset_to(document);
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn history(&self) -> &EditHistory<Document> {
        &self.history
    }

    /// Current value plus undo/redo availability.
    pub fn view(&self) -> HistoryView<'_, Document> {
        self.history.view()
    }

    /// Canonical text of the current document.
    pub fn markdown(&self) -> String {
        self.document().to_markdown()
    }

    /// Whether the canonical text differs from the last saved text.
    pub fn is_dirty(&self) -> bool {
        self.markdown() != self.saved
    }

    /// Record the current text as saved and return it for persistence.
    pub fn mark_saved(&mut self) -> &str {
        self.saved = self.markdown();
        &self.saved
    }

    /// Apply an edit now. See [`EditorSession::apply_at`].
    pub fn apply(&mut self, intent: EditIntent) -> Result<Option<SlideId>> {
        self.apply_at(intent, Instant::now())
    }

    /// Apply an edit at time `now`.
    ///
    /// Returns the id of the slide created by inserts and duplicates.
    /// A failed edit leaves the document and history untouched.
    pub fn apply_at(&mut self, intent: EditIntent, now: Instant) -> Result<Option<SlideId>> {
        self.edit_at(now, |doc| apply_intent(doc, intent))
    }

    pub fn set_slide_content(&mut self, id: &SlideId, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        self.edit(|doc| {
            slide_mut(doc, id)?.content = content;
            Ok(())
        })
    }

    pub fn set_slide_comment(&mut self, id: &SlideId, comment: impl Into<String>) -> Result<()> {
        let comment = comment.into();
        self.edit(|doc| {
            slide_mut(doc, id)?.comment = comment;
            Ok(())
        })
    }

    pub fn insert_slide_after(
        &mut self,
        after: &SlideId,
        content: impl Into<String>,
    ) -> Result<SlideId> {
        let content = content.into();
        self.edit(|doc| insert_after(doc, after, content))
    }

    pub fn add_slide(&mut self, content: impl Into<String>) -> SlideId {
        let mut document = self.history.present().clone();
        let id = append(&mut document, content.into());
        self.history.set(document);
        id
    }

    pub fn duplicate_slide(&mut self, id: &SlideId) -> Result<SlideId> {
        self.edit(|doc| duplicate(doc, id))
    }

    pub fn delete_slide(&mut self, id: &SlideId) -> Result<()> {
        self.edit(|doc| delete(doc, id))
    }

    pub fn move_slide(&mut self, from: usize, to: usize) -> Result<()> {
        self.edit(|doc| move_to(doc, from, to))
    }

    pub fn set_frontmatter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let mut document = self.history.present().clone();
        document.frontmatter.insert(key, value);
        self.history.set(document);
    }

    /// Remove a frontmatter field. Returns whether it existed.
    pub fn remove_frontmatter(&mut self, key: &str) -> bool {
        let mut document = self.history.present().clone();
        let existed = document.frontmatter.remove(key).is_some();
        if existed {
            self.history.set(document);
        }
        existed
    }

    fn edit<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Document) -> Result<R>,
    {
        self.edit_at(Instant::now(), f)
    }

    /// Run `f` on a copy of the present and record the result as an edit.
    fn edit_at<R, F>(&mut self, now: Instant, f: F) -> Result<R>
    where
        F: FnOnce(&mut Document) -> Result<R>,
    {
        let mut document = self.history.present().clone();
        let out = f(&mut document)?;
        self.history.set_at(document, now);
        Ok(out)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    /// Handle an undo/redo request, e.g. from a keyboard shortcut.
    pub fn apply_history(&mut self, action: HistoryAction) -> bool {
        self.history.apply(action)
    }

    /// Explicit save point in the history.
    pub fn checkpoint(&mut self) -> bool {
        self.history.checkpoint()
    }

    /// Fire an expired debounced checkpoint.
    pub fn poll(&mut self) -> bool {
        self.history.poll()
    }

    pub fn poll_at(&mut self, now: Instant) -> bool {
        self.history.poll_at(now)
    }

    /// Stash the current document (slide ids included) in a draft store.
    pub fn stash_draft<S: DraftStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        draft::save_draft(store, &draft_key(&self.key), self.document())
    }

    /// Reopen a document previously stashed with [`EditorSession::stash_draft`].
    ///
    /// `persisted` is the text currently in storage for `key` (empty if the
    /// document was never saved). The session is dirty whenever the draft
    /// differs from it.
    pub fn restore_draft<S: DraftStore + ?Sized>(
        key: &str,
        persisted: &str,
        store: &S,
        config: HistoryConfig,
    ) -> Result<Option<Self>> {
        let document: Option<Document> = draft::load_draft(store, &draft_key(key))?;
        let saved = Document::parse(persisted).to_markdown();
        Ok(document.map(|doc| Self::with_baseline(key, doc, saved, config)))
    }

    /// Remove the stashed draft for this document.
    pub fn discard_draft<S: DraftStore + ?Sized>(&self, store: &mut S) {
        store.remove(&draft_key(&self.key));
    }
}

fn draft_key(key: &str) -> String {
    format!("draft:{}", key)
}

/// Apply one intent to a document, keeping the slide list non-empty.
fn apply_intent(document: &mut Document, intent: EditIntent) -> Result<Option<SlideId>> {
    match intent {
        EditIntent::SetContent { id, content } => {
            slide_mut(document, &id)?.content = content;
        }
        EditIntent::SetComment { id, comment } => {
            slide_mut(document, &id)?.comment = comment;
        }
        EditIntent::InsertAfter { after, content } => {
            return insert_after(document, &after, content).map(Some);
        }
        EditIntent::Append { content } => return Ok(Some(append(document, content))),
        EditIntent::Duplicate { id } => return duplicate(document, &id).map(Some),
        EditIntent::Delete { id } => delete(document, &id)?,
        EditIntent::Move { from, to } => move_to(document, from, to)?,
        EditIntent::SetField { key, value } => {
            document.frontmatter.insert(key, value);
        }
        EditIntent::RemoveField { key } => {
            document.frontmatter.remove(&key);
        }
    }
    Ok(None)
}

fn insert_after(document: &mut Document, after: &SlideId, content: String) -> Result<SlideId> {
    let index = position(document, after)?;
    let slide = SlideBlock::created(content);
    let id = slide.id.clone();
    document.slides.insert(index + 1, slide);
    Ok(id)
}

fn append(document: &mut Document, content: String) -> SlideId {
    let slide = SlideBlock::created(content);
    let id = slide.id.clone();
    document.slides.push(slide);
    id
}

fn duplicate(document: &mut Document, id: &SlideId) -> Result<SlideId> {
    let index = position(document, id)?;
    let copy = document.slides[index].duplicate();
    let new_id = copy.id.clone();
    document.slides.insert(index + 1, copy);
    Ok(new_id)
}

fn delete(document: &mut Document, id: &SlideId) -> Result<()> {
    let index = position(document, id)?;
    if document.slides.len() == 1 {
        return Err(Error::LastSlide);
    }
    document.slides.remove(index);
    Ok(())
}

fn move_to(document: &mut Document, from: usize, to: usize) -> Result<()> {
    let len = document.slides.len();
    for index in [from, to] {
        if index >= len {
            return Err(Error::SlideIndexOutOfRange { index, len });
        }
    }
    let slide = document.slides.remove(from);
    document.slides.insert(to, slide);
    Ok(())
}

fn position(document: &Document, id: &SlideId) -> Result<usize> {
    document
        .position_of(id)
        .ok_or_else(|| Error::SlideNotFound(id.clone()))
}

fn slide_mut<'a>(document: &'a mut Document, id: &SlideId) -> Result<&'a mut SlideBlock> {
    document
        .slides
        .iter_mut()
        .find(|s| &s.id == id)
        .ok_or_else(|| Error::SlideNotFound(id.clone()))
}
