//! Error types for deck editing.

use thiserror::Error;

use crate::types::SlideId;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while applying edits to a deck.
///
/// Parsing never fails: malformed input is recovered on a best-effort
/// basis. Only edit intents and draft storage can produce errors.
#[derive(Error, Debug)]
pub enum Error {
    /// No slide with the given identifier exists in the document.
    #[error("Slide not found: {0}")]
    SlideNotFound(SlideId),

    /// A positional slide index was outside the slide list.
    #[error("Slide index {index} out of range (deck has {len} slides)")]
    SlideIndexOutOfRange { index: usize, len: usize },

    /// Deleting the slide would leave the deck without slides.
    #[error("Cannot delete the last remaining slide")]
    LastSlide,

    /// Failed to encode or decode a stored draft.
    #[error("Draft serialization error: {0}")]
    Draft(#[from] serde_json::Error),
}
