//! Document model and edit history for markdown slide decks.
//!
//! A deck is a single text blob: a `---`-delimited frontmatter header
//! followed by slides separated by `---` lines. This crate parses that
//! text into a [`Document`], serializes it back, and provides the
//! undo/redo [`EditHistory`] used while editing.

pub mod assemble;
pub mod draft;
pub mod error;
pub mod frontmatter;
pub mod history;
pub mod session;
pub mod slides;
pub mod types;

pub use draft::{DraftStore, MemoryDraftStore};
pub use error::{Error, Result};
pub use history::{EditHistory, HistoryAction, HistoryConfig, HistoryView};
pub use session::{EditIntent, EditorSession};
pub use types::{Document, Frontmatter, SlideBlock, SlideId};
