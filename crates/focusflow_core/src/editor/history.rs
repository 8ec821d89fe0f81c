//! Undo/redo history for the editable surface.
//!
//! # Invariants
//! - Each entry is a full snapshot; restoring one never replays edits.
//! - Recording a new step clears the redo stack.
//! - The undo stack is bounded; the oldest steps are dropped first.

use crate::editor::dom::Document;
use crate::editor::surface::Selection;

pub const HISTORY_LIMIT: usize = 100;

/// Document plus selection as they were before an edit step.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub doc: Document,
    pub selection: Option<Selection>,
}

#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl History {
    pub fn record(&mut self, before: Snapshot) {
        self.undo.push(before);
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Swaps `current` for the previous snapshot.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
