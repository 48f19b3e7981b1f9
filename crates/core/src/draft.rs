//! Key-value storage for unsaved editor drafts.
//!
//! Drafts are session state kept outside the document itself (for
//! example a browser's local storage). The core only needs a string
//! key-value store; values are JSON encoded.

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;

/// String key-value storage for drafts.
pub trait DraftStore {
    /// Read the value stored under `key`.
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn store(&mut self, key: &str, value: String);

    /// Delete the value stored under `key`, if any.
    fn remove(&mut self, key: &str);
}

/// In-memory draft store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: HashMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// JSON-encode `value` and store it under `key`.
pub fn save_draft<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: DraftStore + ?Sized,
    T: Serialize,
{
    let json = serde_json::to_string(value)?;
    debug!("Storing draft {} ({} bytes)", key, json.len());
    store.store(key, json);
    Ok(())
}

/// Load and decode the draft stored under `key`. Missing drafts are `None`.
pub fn load_draft<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: DraftStore + ?Sized,
    T: DeserializeOwned,
{
    match store.load(key) {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WizardDraft {
        topic: String,
        slide_count: u32,
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryDraftStore::new();
        let draft = WizardDraft {
            topic: "Rust".to_string(),
            slide_count: 8,
        };
        save_draft(&mut store, "wizard", &draft).unwrap();
        save_draft(&mut store, "wizard", &draft).unwrap();
        assert_eq!(store.len(), 1);

        let loaded: Option<WizardDraft> = load_draft(&store, "wizard").unwrap();
        assert_eq!(loaded, Some(draft));
    }

    #[test]
    fn test_missing_draft_is_none() {
        let store = MemoryDraftStore::new();
        let loaded: Option<WizardDraft> = load_draft(&store, "nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_draft_is_an_error() {
        let mut store = MemoryDraftStore::new();
        store.store("wizard", "{not json".to_string());

        let result: Result<Option<WizardDraft>> = load_draft(&store, "wizard");
        assert!(matches!(result, Err(Error::Draft(_))));
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryDraftStore::new();
        store.store("a", "1".to_string());
        store.store("b", "2".to_string());
        assert_eq!(store.len(), 2);
        store.remove("a");
        store.remove("b");
        assert!(store.is_empty());
    }
}
