//! Snapshot-based undo/redo.
//!
//! Every effective mutation pushes the previous state onto a bounded `past`
//! stack. Mutations that leave the state structurally equal are dropped, so
//! the history only ever holds real changes.

use std::collections::VecDeque;

use tracing::trace;

/// Maximum number of undo steps kept.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct History<T> {
    /// Oldest first, most recent last.
    past: VecDeque<T>,
    present: T,
    /// Most recent first.
    future: VecDeque<T>,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(present: T) -> Self {
        Self::with_limit(present, MAX_HISTORY)
    }

    pub fn with_limit(present: T, limit: usize) -> Self {
        History {
            past: VecDeque::new(),
            present,
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// The current, rendered state.
    pub fn present(&self) -> &T {
        &self.present
    }

    pub fn into_present(self) -> T {
        self.present
    }

    /// Apply `updater` to the present state. Returns false (and records
    /// nothing) when the result equals the present.
    pub fn mutate(&mut self, updater: impl FnOnce(&T) -> T) -> bool {
        let next = updater(&self.present);
        if next == self.present {
            trace!("history: no-op mutation ignored");
            return false;
        }

        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        trace!(past = self.past.len(), "history: mutation recorded");
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        trace!(past = self.past.len(), future = self.future.len(), "history: undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        trace!(past = self.past.len(), future = self.future.len(), "history: redo");
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Drop all undo and redo entries, keeping the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutate_then_undo_redo() {
        let mut h = History::new(0);
        assert!(h.mutate(|v| v + 1));
        assert!(h.mutate(|v| v + 1));
        assert_eq!(*h.present(), 2);

        assert!(h.undo());
        assert_eq!(*h.present(), 1);
        assert!(h.can_redo());

        assert!(h.redo());
        assert_eq!(*h.present(), 2);
        assert!(!h.can_redo());
    }

    #[test]
    fn no_op_mutation_is_not_recorded() {
        let mut h = History::new(vec![1, 2]);
        assert!(!h.mutate(|v| v.clone()));
        assert_eq!(h.past_len(), 0);
    }

    #[test]
    fn undo_redo_on_empty_stacks_do_nothing() {
        let mut h = History::new("a".to_string());
        assert!(!h.undo());
        assert!(!h.redo());
        assert_eq!(h.present(), "a");
    }

    #[test]
    fn new_mutation_clears_redo() {
        let mut h = History::new(0);
        h.mutate(|_| 1);
        h.mutate(|_| 2);
        h.undo();
        assert_eq!(h.future_len(), 1);
        h.mutate(|_| 5);
        assert_eq!(h.future_len(), 0);
        assert_eq!(*h.present(), 5);
    }

    #[test]
    fn past_is_bounded_and_drops_oldest() {
        let mut h = History::new(0);
        for i in 1..=60 {
            h.mutate(|_| i);
        }
        assert_eq!(h.past_len(), MAX_HISTORY);
        while h.undo() {}
        // States 0..=9 fell off the bottom.
        assert_eq!(*h.present(), 10);
    }

    #[test]
    fn present_never_duplicated_in_stacks() {
        let mut h = History::new(0);
        h.mutate(|_| 1);
        h.mutate(|_| 2);
        h.undo();
        assert!(!h.past.contains(h.present()));
        assert!(!h.future.contains(h.present()));
    }
}
