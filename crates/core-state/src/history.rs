//! Two-stack undo/redo history over full-text snapshots.
//!
//! The history owns the authoritative copy of the prompt text. Every edit
//! flows through `record`, which pushes the previous text onto the undo
//! stack and clears the redo stack (redoing after a divergent edit is
//! meaningless). A no-op edit (new == current) records nothing. Depth is
//! capped at `HISTORY_MAX`; the oldest snapshot is dropped past the cap.

use thiserror::Error;
use tracing::trace;

/// Maximum number of snapshots retained on the undo stack.
pub const HISTORY_MAX: usize = 200;

/// Signaled no-op outcomes of `undo`/`redo`. Not fatal; callers surface
/// them as a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    EmptyUndo,
    #[error("nothing to redo")]
    EmptyRedo,
}

/// Undo/redo snapshot manager for the editable text.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    current: String,
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
}

impl UndoHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: initial.into(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The text as of the latest recorded edit.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Apply an edit: snapshot the previous text and make `new_text`
    /// current. Returns false (and records nothing) when the edit is a
    /// no-op.
    pub fn record(&mut self, new_text: impl Into<String>) -> bool {
        let new_text = new_text.into();
        if new_text == self.current {
            trace!(target: "state.history", "record_noop_skipped");
            return false;
        }
        self.undo_stack
            .push(std::mem::replace(&mut self.current, new_text));
        if self.undo_stack.len() > HISTORY_MAX {
            self.undo_stack.remove(0);
            trace!(target: "state.history", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
        trace!(
            target: "state.history",
            undo_depth = self.undo_stack.len(),
            "snapshot_recorded"
        );
        true
    }

    /// Restore the previous snapshot; the replaced text becomes redoable.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let Some(prev) = self.undo_stack.pop() else {
            return Err(HistoryError::EmptyUndo);
        };
        self.redo_stack
            .push(std::mem::replace(&mut self.current, prev));
        trace!(
            target: "state.history",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo"
        );
        Ok(())
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let Some(next) = self.redo_stack.pop() else {
            return Err(HistoryError::EmptyRedo);
        };
        self.undo_stack
            .push(std::mem::replace(&mut self.current, next));
        trace!(
            target: "state.history",
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "redo"
        );
        Ok(())
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_undo_redo_sequence() {
        let mut h = UndoHistory::new("A");
        assert!(h.record("B"));
        h.undo().unwrap();
        assert_eq!(h.current(), "A");
        h.redo().unwrap();
        assert_eq!(h.current(), "B");
    }

    #[test]
    fn undo_on_empty_stack_signals_and_keeps_text() {
        let mut h = UndoHistory::new("A");
        assert_eq!(h.undo(), Err(HistoryError::EmptyUndo));
        assert_eq!(h.current(), "A");
    }

    #[test]
    fn redo_on_empty_stack_signals() {
        let mut h = UndoHistory::new("A");
        assert_eq!(h.redo(), Err(HistoryError::EmptyRedo));
    }

    #[test]
    fn noop_record_takes_no_snapshot() {
        let mut h = UndoHistory::new("A");
        assert!(!h.record("A"));
        assert_eq!(h.undo_depth(), 0);
        assert_eq!(h.undo(), Err(HistoryError::EmptyUndo));
    }

    #[test]
    fn fresh_edit_clears_redo() {
        let mut h = UndoHistory::new("A");
        h.record("B");
        h.undo().unwrap();
        assert_eq!(h.redo_depth(), 1);
        h.record("C");
        assert_eq!(h.redo_depth(), 0);
        assert_eq!(h.redo(), Err(HistoryError::EmptyRedo));
        assert_eq!(h.current(), "C");
    }

    #[test]
    fn multi_step_round_trip() {
        let mut h = UndoHistory::new("");
        for s in ["a", "ab", "abc"] {
            h.record(s);
        }
        h.undo().unwrap();
        h.undo().unwrap();
        assert_eq!(h.current(), "a");
        h.redo().unwrap();
        assert_eq!(h.current(), "ab");
    }

    #[test]
    fn depth_is_capped() {
        let mut h = UndoHistory::new("0");
        for i in 1..=(HISTORY_MAX + 50) {
            h.record(i.to_string());
        }
        assert_eq!(h.undo_depth(), HISTORY_MAX);
        // Oldest snapshots were dropped; undoing all the way lands on the
        // earliest retained text, not "0".
        while h.undo().is_ok() {}
        assert_eq!(h.current(), "50");
    }
}
