//! Snapshot history for undo/redo.
//!
//! Each entry is a deep copy of the element sequence as it looked *before* a
//! committed mutation, so the first undo after a single action restores the
//! empty board.

use crate::elements::Element;
use std::collections::VecDeque;

/// Maximum number of undo states to keep.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded undo stack with a redo direction.
#[derive(Debug, Clone)]
pub struct History {
    /// Pre-action snapshots, oldest first.
    undo_stack: VecDeque<Vec<Element>>,
    /// States undone from, most recent last.
    redo_stack: Vec<Vec<Element>>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    /// Create a history keeping at most `capacity` undo states (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state before a mutation. Clears the redo direction and
    /// evicts the oldest entry past capacity.
    pub fn snapshot(&mut self, before: &[Element]) {
        self.undo_stack.push_back(before.to_vec());
        self.redo_stack.clear();

        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    /// Restore the most recent pre-action state into `current`.
    /// Returns false (and leaves `current` alone) if there is nothing to undo.
    pub fn undo(&mut self, current: &mut Vec<Element>) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let undone = std::mem::replace(current, previous);
        self.redo_stack.push(undone);
        true
    }

    /// Re-apply the last undone state.
    pub fn redo(&mut self, current: &mut Vec<Element>) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let before = std::mem::replace(current, next);
        self.undo_stack.push_back(before);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo states held.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Drop both directions.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
