//! History - Bounded undo/redo stack of form data snapshots.

use std::collections::VecDeque;

use super::types::FormData;

pub(crate) struct History<V> {
    undo: VecDeque<FormData<V>>,
    redo: Vec<FormData<V>>,
    limit: usize,
}

impl<V: Clone> History<V> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the data as it was before a committed mutation.
    /// Any redo-able state is discarded.
    pub fn record(&mut self, before: FormData<V>) {
        self.redo.clear();
        self.push_undo(before);
    }

    /// Swap `current` for the previous snapshot.
    pub fn undo(&mut self, current: FormData<V>) -> Option<FormData<V>> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Swap `current` for the most recently undone snapshot.
    pub fn redo(&mut self, current: FormData<V>) -> Option<FormData<V>> {
        let next = self.redo.pop()?;
        self.push_undo(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    fn push_undo(&mut self, snapshot: FormData<V>) {
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }
}
