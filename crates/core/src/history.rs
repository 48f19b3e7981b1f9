//! Undo/redo history with debounced checkpoints.
//!
//! Edits replace the present value immediately, but only reach the undo
//! stack once the editor has been quiet for the debounce interval, so a
//! burst of keystrokes collapses into one undo step.
//!
//! No timer threads or callbacks are involved. A pending checkpoint is a
//! deadline owned by the history; the host calls [`EditHistory::poll`]
//! (or schedules a wake-up at [`EditHistory::next_deadline`]) to fire it.
//! Every mutating call also fires an already-expired deadline first.
//! Cancelling means clearing the deadline, so a dropped or reset history
//! can never receive a stale checkpoint.

use log::{debug, trace};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Quiet period after the last edit before it is checkpointed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Undo entries kept before the oldest are evicted.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// History tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Quiet period that coalesces successive edits.
    pub debounce: Duration,

    /// Maximum number of undo entries.
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce interval.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the maximum number of undo entries.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }
}

/// What the UI layer needs to render history controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryView<'a, T> {
    pub value: &'a T,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Undo or redo, as requested by a keyboard shortcut or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    /// Map a key press to a history action.
    ///
    /// Ctrl/Cmd+Z undoes, Ctrl/Cmd+Shift+Z and Ctrl+Y redo.
    pub fn from_shortcut(key: &str, ctrl: bool, meta: bool, shift: bool) -> Option<Self> {
        if !ctrl && !meta {
            return None;
        }
        match key.to_ascii_lowercase().as_str() {
            "z" if shift => Some(Self::Redo),
            "z" => Some(Self::Undo),
            "y" if ctrl && !shift => Some(Self::Redo),
            _ => None,
        }
    }
}

/// Bounded undo/redo stack over snapshots of `T`.
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    config: HistoryConfig,

    /// Value the history was created with, restored by `reset`.
    initial: T,

    /// Older snapshots, oldest first.
    past: VecDeque<T>,

    present: T,

    /// Undone snapshots, next redo first.
    future: VecDeque<T>,

    /// Last value written to history; the next checkpoint pushes this.
    checkpointed: T,

    /// Deadline of the pending debounced checkpoint.
    pending: Option<Instant>,
}

impl<T: Clone + PartialEq> EditHistory<T> {
    /// Create a history with the default configuration.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Create a history with a custom configuration.
    pub fn with_config(initial: T, config: HistoryConfig) -> Self {
        Self {
            config,
            past: VecDeque::new(),
            present: initial.clone(),
            future: VecDeque::new(),
            checkpointed: initial.clone(),
            initial,
            pending: None,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The current value.
    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn view(&self) -> HistoryView<'_, T> {
        HistoryView {
            value: &self.present,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Number of undo entries.
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redo entries.
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// When the pending checkpoint fires, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the present value. See [`EditHistory::set_at`].
    pub fn set(&mut self, value: T) -> bool {
        self.set_at(value, Instant::now())
    }

    /// Replace the present value at time `now`.
    ///
    /// A value equal to the present is ignored. Otherwise the present is
    /// updated, the redo stack is dropped, and the debounced checkpoint is
    /// re-armed. Returns whether anything changed.
    pub fn set_at(&mut self, value: T, now: Instant) -> bool {
        self.poll_at(now);
        if value == self.present {
            return false;
        }

        self.present = value;
        self.future.clear();
        if self.pending.is_some() {
            trace!("Coalescing edit into pending checkpoint");
        }
        self.pending = Some(now + self.config.debounce);
        true
    }

    /// Derive the next value from the present. See [`EditHistory::set_at`].
    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        self.update_at(f, Instant::now())
    }

    pub fn update_at<F>(&mut self, f: F, now: Instant) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        self.poll_at(now);
        let next = f(&self.present);
        self.set_at(next, now)
    }

    /// Fire the pending checkpoint if its deadline has passed.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    /// Fire the pending checkpoint if its deadline is at or before `now`.
    /// Returns whether an entry was pushed.
    pub fn poll_at(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(deadline) if deadline <= now => {
                self.pending = None;
                self.commit()
            }
            _ => false,
        }
    }

    /// Checkpoint immediately, bypassing the debounce.
    ///
    /// Does nothing if the present is already checkpointed.
    pub fn checkpoint(&mut self) -> bool {
        self.pending = None;
        self.commit()
    }

    /// Drop the pending checkpoint without recording it.
    pub fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            trace!("Cancelled pending checkpoint");
        }
    }

    pub fn undo(&mut self) -> bool {
        self.undo_at(Instant::now())
    }

    /// Step back one entry. An uncommitted edit is checkpointed first so it
    /// can be redone. No-op when there is nothing to undo.
    pub fn undo_at(&mut self, now: Instant) -> bool {
        self.poll_at(now);
        self.checkpoint();

        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        self.checkpointed = self.present.clone();

        debug!(
            "Undo: {} past, {} future",
            self.past.len(),
            self.future.len()
        );
        true
    }

    pub fn redo(&mut self) -> bool {
        self.redo_at(Instant::now())
    }

    /// Step forward one entry. No-op when there is nothing to redo.
    pub fn redo_at(&mut self, now: Instant) -> bool {
        self.poll_at(now);

        let Some(next) = self.future.pop_front() else {
            return false;
        };
        self.pending = None;
        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        self.checkpointed = self.present.clone();

        debug!(
            "Redo: {} past, {} future",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Apply an undo or redo request.
    pub fn apply(&mut self, action: HistoryAction) -> bool {
        match action {
            HistoryAction::Undo => self.undo(),
            HistoryAction::Redo => self.redo(),
        }
    }

    /// Forget all undo and redo entries, keeping the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.pending = None;
        self.checkpointed = self.present.clone();
    }

    /// Return to the construction value with empty history.
    pub fn reset(&mut self) {
        let initial = self.initial.clone();
        self.reset_to(initial);
    }

    /// Replace the present with `value` and start a fresh history.
    pub fn reset_to(&mut self, value: T) {
        self.past.clear();
        self.future.clear();
        self.pending = None;
        self.checkpointed = value.clone();
        self.present = value;
        debug!("History reset");
    }

    /// Push the last checkpointed value if the present has moved on.
    fn commit(&mut self) -> bool {
        if self.checkpointed == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.checkpointed, self.present.clone());
        self.push_past(previous);
        debug!("Checkpoint: {} past entries", self.past.len());
        true
    }

    fn push_past(&mut self, value: T) {
        self.past.push_back(value);
        while self.past.len() > self.config.max_history {
            self.past.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// History with the default 500ms debounce and a committed edit per value.
    fn history_with_edits(values: &[i32]) -> EditHistory<i32> {
        let mut history = EditHistory::new(0);
        for &v in values {
            history.set(v);
            history.checkpoint();
        }
        history
    }

    #[test]
    fn test_set_updates_present_immediately() {
        let mut history = EditHistory::new(0);
        assert!(history.set(1));

        assert_eq!(*history.present(), 1);
        assert!(history.has_pending());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_set_equal_value_is_noop() {
        let mut history = EditHistory::new(String::from("a"));
        assert!(!history.set(String::from("a")));
        assert!(!history.has_pending());
    }

    #[test]
    fn test_rapid_sets_coalesce() {
        let t0 = Instant::now();
        let mut history = EditHistory::new(0);

        for i in 1..=5 {
            history.set_at(i, t0 + ms(100 * i as u64));
        }
        assert!(!history.poll_at(t0 + ms(900)));
        assert!(history.poll_at(t0 + ms(1000)));

        assert_eq!(history.past_len(), 1);
        assert_eq!(*history.present(), 5);

        history.undo_at(t0 + ms(1100));
        assert_eq!(*history.present(), 0);
    }

    #[test]
    fn test_sets_apart_create_separate_entries() {
        let t0 = Instant::now();
        let mut history = EditHistory::new(0);

        history.set_at(1, t0);
        history.set_at(2, t0 + ms(600));
        assert_eq!(history.past_len(), 1);

        history.poll_at(t0 + ms(1200));
        assert_eq!(history.past_len(), 2);

        history.undo_at(t0 + ms(1300));
        assert_eq!(*history.present(), 1);
        history.undo_at(t0 + ms(1400));
        assert_eq!(*history.present(), 0);
    }

    #[test]
    fn test_next_deadline_tracks_last_set() {
        let t0 = Instant::now();
        let config = HistoryConfig::new().with_debounce(ms(200));
        let mut history = EditHistory::with_config(0, config);
        assert_eq!(history.config().debounce, ms(200));
        assert_eq!(history.next_deadline(), None);

        history.set_at(1, t0);
        history.set_at(2, t0 + ms(50));
        assert_eq!(history.next_deadline(), Some(t0 + ms(250)));
    }

    #[test]
    fn test_poll_without_change_pushes_nothing() {
        let t0 = Instant::now();
        let mut history = EditHistory::new(0);

        history.set_at(1, t0);
        history.set_at(0, t0 + ms(10));
        assert!(!history.poll_at(t0 + ms(600)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let mut history = history_with_edits(&[1, 2, 3]);
        assert_eq!(history.past_len(), 3);

        for _ in 0..3 {
            assert!(history.undo());
        }
        assert_eq!(*history.present(), 0);
        assert!(!history.can_undo());

        for _ in 0..3 {
            assert!(history.redo());
        }
        assert_eq!(*history.present(), 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_commits_pending_edit() {
        let mut history = EditHistory::new(0);
        history.set(1);

        assert!(history.undo());
        assert_eq!(*history.present(), 0);
        assert!(!history.has_pending());

        assert!(history.redo());
        assert_eq!(*history.present(), 1);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = EditHistory::new(0);
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(*history.present(), 0);
    }

    #[test]
    fn test_new_edit_invalidates_redo() {
        let mut history = history_with_edits(&[1, 2]);
        history.undo();
        assert!(history.can_redo());

        history.set(5);
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(*history.present(), 5);
    }

    #[test]
    fn test_max_history_evicts_oldest() {
        let config = HistoryConfig::new().with_max_history(2);
        let mut history = EditHistory::with_config(0, config);
        for v in 1..=4 {
            history.set(v);
            history.checkpoint();
        }
        assert_eq!(history.past_len(), 2);

        history.undo();
        history.undo();
        assert!(!history.undo());
        assert_eq!(*history.present(), 2);
    }

    #[test]
    fn test_checkpoint_is_noop_at_marker() {
        let mut history = history_with_edits(&[1]);
        assert!(!history.checkpoint());
        assert_eq!(history.past_len(), 1);
    }

    #[test]
    fn test_cancel_pending_prevents_checkpoint() {
        let t0 = Instant::now();
        let mut history = EditHistory::new(0);
        history.set_at(1, t0);
        history.cancel_pending();

        assert!(!history.poll_at(t0 + ms(10_000)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear_keeps_present() {
        let t0 = Instant::now();
        let mut history = history_with_edits(&[1, 2]);
        history.undo();
        history.set_at(7, t0);
        history.clear();

        assert_eq!(*history.present(), 7);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.poll_at(t0 + ms(10_000)));
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut history = history_with_edits(&[1, 2]);
        history.set(9);
        history.reset();

        assert_eq!(*history.present(), 0);
        assert!(!history.can_undo());
        assert!(!history.has_pending());
    }

    #[test]
    fn test_reset_to_new_value() {
        let mut history = history_with_edits(&[1, 2]);
        history.reset_to(40);

        assert_eq!(*history.present(), 40);
        assert!(!history.can_undo());

        history.set(41);
        history.checkpoint();
        history.undo();
        assert_eq!(*history.present(), 40);
    }

    #[test]
    fn test_update_with_closure() {
        let mut history = EditHistory::new(vec![1]);
        history.update(|v| {
            let mut next = v.clone();
            next.push(2);
            next
        });
        assert_eq!(history.present(), &vec![1, 2]);
    }

    #[test]
    fn test_view_flags() {
        let mut history = history_with_edits(&[1]);
        let view = history.view();
        assert_eq!(*view.value, 1);
        assert!(view.can_undo);
        assert!(!view.can_redo);

        history.apply(HistoryAction::Undo);
        let view = history.view();
        assert!(!view.can_undo);
        assert!(view.can_redo);
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            HistoryAction::from_shortcut("z", true, false, false),
            Some(HistoryAction::Undo)
        );
        assert_eq!(
            HistoryAction::from_shortcut("Z", false, true, true),
            Some(HistoryAction::Redo)
        );
        assert_eq!(
            HistoryAction::from_shortcut("y", true, false, false),
            Some(HistoryAction::Redo)
        );
        assert_eq!(HistoryAction::from_shortcut("z", false, false, false), None);
        assert_eq!(HistoryAction::from_shortcut("y", false, true, false), None);
        assert_eq!(HistoryAction::from_shortcut("x", true, false, false), None);
    }
}
