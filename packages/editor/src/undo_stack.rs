//! # Undo/Redo Stack
//!
//! Snapshot-based history for a document.
//!
//! ## Design
//!
//! - Before a command runs, the session takes a snapshot of the document
//! - If the command changed the document, the snapshot is pushed for undo
//! - Undo restores the snapshot and pushes the current state for redo
//! - New changes clear the redo stack
//! - Batches record one snapshot for several commands
//!
//! Snapshots are whole-tree clones that carry every block id, so ids are the
//! same after an undo as they were before the change.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let before = doc.snapshot();
//! doc.update(|tx| ...);
//! stack.record(before, "insert-mcq");
//!
//! stack.undo(&mut doc);
//! stack.redo(&mut doc);
//! ```

use crate::document::{Document, DocumentSnapshot};

/// One undoable step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// State to return to
    pub snapshot: DocumentSnapshot,

    /// Optional description of this step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(snapshot: DocumentSnapshot) -> Self {
        Self {
            snapshot,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// States before each applied step (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// States before each undone step (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<HistoryEntry>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the state from before a change.
    ///
    /// Inside a batch this is a no-op: the batch already holds the state from
    /// before its first change.
    pub fn record(&mut self, before: DocumentSnapshot, description: impl Into<String>) {
        if self.current_batch.is_some() {
            return;
        }
        self.push_entry(HistoryEntry::new(before).with_description(description));
    }

    /// Start a batch of changes (will be undone/redone together)
    pub fn begin_batch(&mut self, doc: &Document) {
        self.current_batch = Some(HistoryEntry::new(doc.snapshot()));
    }

    /// End the current batch and push it if the document changed
    pub fn end_batch(&mut self, doc: &Document) {
        if let Some(batch) = self.current_batch.take() {
            if batch.snapshot.version() != doc.version() {
                self.push_entry(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Push an entry to the undo stack
    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Undo the most recent step; false if there is nothing to undo
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        let current = HistoryEntry {
            snapshot: doc.snapshot(),
            description: entry.description.clone(),
        };
        doc.restore(entry.snapshot);
        self.redo_stack.push(current);
        true
    }

    /// Redo the most recently undone step; false if there is nothing to redo
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        let current = HistoryEntry {
            snapshot: doc.snapshot(),
            description: entry.description.clone(),
        };
        doc.restore(entry.snapshot);
        self.undo_stack.push(current);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn append_paragraph(doc: &mut Document, stack: &mut UndoStack) {
        let before = doc.snapshot();
        doc.update(|tx| {
            let p = tx.create_paragraph();
            let root = tx.tree().root();
            tx.tree_mut().append(root, p).unwrap();
        });
        stack.record(before, "append");
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo() {
        let mut doc = Document::new(&EditorConfig::sequential("u"));
        let mut stack = UndoStack::new();

        append_paragraph(&mut doc, &mut stack);
        assert_eq!(doc.blocks().len(), 2);
        assert_eq!(stack.undo_description(), Some("append"));

        assert!(stack.undo(&mut doc));
        assert_eq!(doc.blocks().len(), 1);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc));
        assert_eq!(doc.blocks().len(), 2);
        assert!(!stack.redo(&mut doc));
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut doc = Document::new(&EditorConfig::sequential("u"));
        let mut stack = UndoStack::new();

        append_paragraph(&mut doc, &mut stack);
        stack.undo(&mut doc);
        append_paragraph(&mut doc, &mut stack);

        assert!(!stack.can_redo());
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_max_levels() {
        let mut doc = Document::new(&EditorConfig::sequential("u"));
        let mut stack = UndoStack::with_max_levels(2);

        for _ in 0..3 {
            append_paragraph(&mut doc, &mut stack);
        }
        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_batch_undoes_together() {
        let mut doc = Document::new(&EditorConfig::sequential("u"));
        let mut stack = UndoStack::new();

        stack.begin_batch(&doc);
        stack.set_batch_description("two paragraphs");
        append_paragraph(&mut doc, &mut stack);
        append_paragraph(&mut doc, &mut stack);
        stack.end_batch(&doc);

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("two paragraphs"));
        stack.undo(&mut doc);
        assert_eq!(doc.blocks().len(), 1);
    }

    #[test]
    fn test_empty_batch_not_recorded() {
        let doc = Document::new(&EditorConfig::sequential("u"));
        let mut stack = UndoStack::new();
        stack.begin_batch(&doc);
        stack.end_batch(&doc);
        assert!(!stack.can_undo());
    }
}
