//! Undo/redo history.
//!
//! One list of document snapshots plus a cursor covers every collection, so
//! undo always reverses the most recent change regardless of element kind.
//! Snapshots share unchanged collections, so each entry costs a handful of
//! reference counts plus whichever collection the commit replaced.

use crate::document::DocumentSnapshot;

/// Default maximum number of history entries.
pub const MAX_HISTORY: usize = 100;

/// Snapshot list plus cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<DocumentSnapshot>,
    cursor: usize,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DocumentSnapshot::default(), MAX_HISTORY)
    }
}

impl History {
    /// Start a history whose earliest entry is `initial`.
    ///
    /// `max_entries` counts the initial entry and is at least 2.
    pub fn new(initial: DocumentSnapshot, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_entries: max_entries.max(2),
        }
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> &DocumentSnapshot {
        &self.entries[self.cursor]
    }

    /// Record a new state.
    ///
    /// Discards every entry after the cursor, appends `snapshot` and moves the
    /// cursor to it. A snapshot pointer-equal to the current entry is ignored.
    /// Returns whether an entry was added.
    pub fn commit(&mut self, snapshot: DocumentSnapshot) -> bool {
        if snapshot.ptr_eq(self.current()) {
            return false;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);

        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
        log::debug!("History commit: {} entries", self.entries.len());
        true
    }

    /// Step back one entry. `None` at the earliest entry.
    pub fn undo(&mut self) -> Option<&DocumentSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("Undo to entry {}", self.cursor);
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. `None` at the tail.
    pub fn redo(&mut self) -> Option<&DocumentSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("Redo to entry {}", self.cursor);
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Forget everything and start over from `initial`.
    pub fn reset(&mut self, initial: DocumentSnapshot) {
        self.entries.clear();
        self.entries.push(initial);
        self.cursor = 0;
    }

    /// Number of stored entries, the initial one included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a history holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::shapes::{Shape, ShapeKind};
    use kurbo::Point;

    fn add_rect(doc: &mut Document, x: f64) {
        doc.shapes
            .add(Shape::new(ShapeKind::Rectangle, Point::new(x, 0.0), 10.0, 10.0));
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = Document::new();
        let mut history = History::new(doc.snapshot(), 10);

        add_rect(&mut doc, 0.0);
        assert!(history.commit(doc.snapshot()));
        assert!(history.can_undo());

        let snapshot = history.undo().cloned().unwrap();
        doc.restore(&snapshot);
        assert!(doc.is_empty());
        assert!(history.can_redo());

        let snapshot = history.redo().cloned().unwrap();
        doc.restore(&snapshot);
        assert_eq!(doc.shapes.len(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_truncates_redo() {
        let mut doc = Document::new();
        let mut history = History::new(doc.snapshot(), 10);

        add_rect(&mut doc, 0.0);
        history.commit(doc.snapshot());
        add_rect(&mut doc, 20.0);
        history.commit(doc.snapshot());

        let snapshot = history.undo().cloned().unwrap();
        doc.restore(&snapshot);
        add_rect(&mut doc, 40.0);
        history.commit(doc.snapshot());

        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().shapes.len(), 2);
    }

    #[test]
    fn test_unchanged_commit_ignored() {
        let mut doc = Document::new();
        let mut history = History::new(doc.snapshot(), 10);
        assert!(!history.commit(doc.snapshot()));

        add_rect(&mut doc, 0.0);
        assert!(history.commit(doc.snapshot()));
        assert!(!history.commit(doc.snapshot()));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut doc = Document::new();
        let mut history = History::new(doc.snapshot(), 3);

        for i in 0..5 {
            add_rect(&mut doc, i as f64 * 20.0);
            history.commit(doc.snapshot());
        }

        assert_eq!(history.len(), 3);
        // Oldest reachable state has 3 shapes; the empty start was trimmed.
        while let Some(snapshot) = history.undo().cloned() {
            doc.restore(&snapshot);
        }
        assert_eq!(doc.shapes.len(), 3);
    }

    #[test]
    fn test_reset() {
        let mut doc = Document::new();
        let mut history = History::new(doc.snapshot(), 10);
        add_rect(&mut doc, 0.0);
        history.commit(doc.snapshot());

        history.reset(doc.snapshot());
        assert!(!history.can_undo());
        assert_eq!(history.current().shapes.len(), 1);
    }
}
