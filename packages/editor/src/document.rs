//! # Document Handle
//!
//! A `Document` owns one lesson tree together with its selection and the
//! identity overlay that mints block ids for it.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Import → update(|tx| ..) → Normalize → Export → Save
//!   ↓       ↓            ↓              ↓          ↓       ↓
//! File    Tree      primitives      fixpoint     JSON    File
//! ```
//!
//! All structural edits go through [`Document::update`]. The closure gets a
//! [`Transaction`] with the tree primitives; when it returns, the normalizer
//! runs to fixpoint and the selection is repaired, so nothing outside the
//! closure ever sees a tree that breaks a shape rule.

use crate::codec::{self, CodecError};
use crate::config::EditorConfig;
use crate::identity::{block_index, BlockIdentity};
use crate::normalize::{NormalizeReport, Normalizer};
use crate::EditorError;
use coursekit_common::IdGenerator;
use coursekit_schema::{
    BlockId, ContentTree, NodeData, NodeKey, NodeKind, Point, Selection, TreeResult,
};
use std::path::Path;
use tracing::debug;

/// Editable lesson document
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each structural change)
    version: u64,
    tree: ContentTree,
    selection: Option<Selection>,
    identity: BlockIdentity,
    normalizer: Normalizer,
}

/// Point-in-time copy of a document. The tree is cloned whole, block ids
/// included, so they survive undo and redo
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    tree: ContentTree,
    selection: Option<Selection>,
    version: u64,
}

impl DocumentSnapshot {
    /// Document version the snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
}

impl Document {
    /// New document holding a single empty paragraph with the caret in it
    pub fn new(config: &EditorConfig) -> Self {
        let mut doc = Self::empty(config);
        doc.update(|tx| {
            let paragraph = tx.create_paragraph();
            let root = tx.tree().root();
            if tx.tree_mut().append(root, paragraph).is_ok() {
                tx.select_start(paragraph);
            }
        });
        doc.version = 0;
        doc
    }

    /// Document with nothing under the root
    pub fn empty(config: &EditorConfig) -> Self {
        Self {
            version: 0,
            tree: ContentTree::new(),
            selection: None,
            identity: BlockIdentity::new(IdGenerator::new(config.id_strategy.clone())),
            normalizer: Normalizer::new(),
        }
    }

    /// Import a serialized document
    pub fn from_json(json: &str, config: &EditorConfig) -> Result<Self, EditorError> {
        let mut doc = Self::empty(config);
        doc.import_json(json)?;
        doc.version = 0;
        Ok(doc)
    }

    /// Load a serialized document from disk
    pub fn load(path: &Path, config: &EditorConfig) -> Result<Self, EditorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, config)
    }

    /// Write the serialized document to disk
    pub fn save(&self, path: &Path, pretty: bool) -> Result<(), EditorError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replace the whole content with a serialized document.
    ///
    /// The payload is built into a fresh tree first; on error the document is
    /// left exactly as it was.
    pub fn import_json(&mut self, json: &str) -> Result<NormalizeReport, CodecError> {
        let mut identity = self.identity.clone();
        let mut tree = codec::import_document(json, &mut identity)?;
        let report = self.normalizer.run_all(&mut tree, &mut identity);

        self.tree = tree;
        self.identity = identity;
        self.selection = None;
        self.repair_selection();
        self.version += 1;
        Ok(report)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        codec::export_json(&self.tree)
    }

    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        codec::export_json_pretty(&self.tree)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn identity(&self) -> &BlockIdentity {
        &self.identity
    }

    /// Move the cursor without touching the tree
    pub fn set_selection(&mut self, selection: Option<Selection>) -> Result<(), EditorError> {
        if let Some(sel) = &selection {
            for point in [sel.anchor, sel.focus] {
                if !self.tree.is_valid_point(&point) {
                    return Err(EditorError::InvalidSelection(format!(
                        "{}:{}",
                        point.key, point.offset
                    )));
                }
            }
        }
        self.selection = selection;
        Ok(())
    }

    /// Place a caret at the start of `key`'s content
    pub fn select_start(&mut self, key: NodeKey) -> Result<(), EditorError> {
        let point = self.tree.start_point(key);
        self.set_selection(Some(Selection::caret(point)))
    }

    /// Place a caret at the end of `key`'s content
    pub fn select_end(&mut self, key: NodeKey) -> Result<(), EditorError> {
        let point = self.tree.end_point(key);
        self.set_selection(Some(Selection::caret(point)))
    }

    /// Node currently carrying `id`
    pub fn find_block(&self, id: &BlockId) -> Option<NodeKey> {
        block_index(&self.tree).get(id).copied()
    }

    /// Top-level blocks in document order
    pub fn blocks(&self) -> &[NodeKey] {
        self.tree.children(self.tree.root())
    }

    /// Whether `key` can take the caret: false inside the content of a closed
    /// collapsible
    pub fn is_interactive(&self, key: NodeKey) -> bool {
        if !self.tree.is_attached(key) {
            return false;
        }
        let mut chain = vec![key];
        chain.extend(self.tree.ancestors(key));
        !chain.into_iter().any(|k| {
            self.tree.is_kind(k, NodeKind::CollapsibleContent)
                && self.tree.parent(k).and_then(|p| self.tree.data(p))
                    == Some(&NodeData::CollapsibleContainer { open: false })
        })
    }

    /// Run `f` as one update transaction, then normalize to fixpoint.
    ///
    /// The version is bumped only if the tree actually changed.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> R) -> R {
        let before = self.tree.revision();
        let result = {
            let mut tx = Transaction {
                tree: &mut self.tree,
                selection: &mut self.selection,
                identity: &mut self.identity,
            };
            f(&mut tx)
        };

        let report = self.normalizer.run(&mut self.tree, &mut self.identity);
        if report.repairs > 0 {
            debug!(passes = report.passes, repairs = report.repairs, "Normalized document");
        }
        let freed = self.tree.sweep_detached();
        if freed > 0 {
            debug!(freed, "Freed detached nodes");
        }
        self.repair_selection();

        if self.tree.revision() != before {
            self.version += 1;
        }
        result
    }

    /// Copy of the current state for the undo stack
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            tree: self.tree.clone(),
            selection: self.selection,
            version: self.version,
        }
    }

    /// Return to a previously taken snapshot
    pub fn restore(&mut self, snapshot: DocumentSnapshot) {
        self.tree = snapshot.tree;
        self.selection = snapshot.selection;
        self.repair_selection();
        self.version += 1;
    }

    /// Drop a selection that no longer resolves, falling back to the end of
    /// the document
    fn repair_selection(&mut self) {
        let valid = self.selection.map_or(true, |sel| {
            self.tree.is_valid_point(&sel.anchor) && self.tree.is_valid_point(&sel.focus)
        });
        if valid {
            return;
        }
        let root = self.tree.root();
        let fallback = match self.tree.last_child(root) {
            Some(last) => self.tree.end_point(last),
            None => Point::new(root, 0),
        };
        debug!(fallback = %fallback.key, "Selection no longer resolves, moved to end");
        self.selection = Some(Selection::caret(fallback));
    }
}

/// Mutable view of a document for the duration of [`Document::update`]
pub struct Transaction<'a> {
    tree: &'a mut ContentTree,
    selection: &'a mut Option<Selection>,
    identity: &'a mut BlockIdentity,
}

impl<'a> Transaction<'a> {
    pub fn tree(&self) -> &ContentTree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ContentTree {
        &mut *self.tree
    }

    pub fn identity(&mut self) -> &mut BlockIdentity {
        &mut *self.identity
    }

    pub fn selection(&self) -> Option<Selection> {
        *self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        *self.selection = selection;
    }

    /// Anchor of the current selection, collapsed or not
    pub fn anchor(&self) -> Option<Point> {
        self.selection.map(|s| s.anchor)
    }

    /// Caret position, only when the selection is collapsed
    pub fn caret(&self) -> Option<Point> {
        self.selection
            .filter(|s| s.is_collapsed())
            .map(|s| s.anchor)
    }

    pub fn select_start(&mut self, key: NodeKey) {
        let point = self.tree.start_point(key);
        *self.selection = Some(Selection::caret(point));
    }

    pub fn select_end(&mut self, key: NodeKey) {
        let point = self.tree.end_point(key);
        *self.selection = Some(Selection::caret(point));
    }

    /// Whether the caret sits at the very start of `key`'s content
    pub fn caret_at_start_of(&self, key: NodeKey) -> bool {
        self.caret() == Some(self.tree.start_point(key))
    }

    /// Whether the caret sits at the very end of `key`'s content
    pub fn caret_at_end_of(&self, key: NodeKey) -> bool {
        self.caret() == Some(self.tree.end_point(key))
    }

    /// Create a detached node, minting a block id if it is trackable
    pub fn create(&mut self, data: NodeData) -> NodeKey {
        self.identity.create(&mut *self.tree, data)
    }

    pub fn create_paragraph(&mut self) -> NodeKey {
        self.create(NodeData::Paragraph)
    }

    /// Paragraph holding a single text run; an empty `text` leaves it childless
    pub fn create_paragraph_with_text(&mut self, text: &str) -> TreeResult<NodeKey> {
        let paragraph = self.create_paragraph();
        if !text.is_empty() {
            let run = self.tree.create(NodeData::text(text));
            self.tree.append(paragraph, run)?;
        }
        Ok(paragraph)
    }

    /// Insert a top-level block next to the selection: after the root-level
    /// block holding the anchor, at the anchor offset when the anchor is the
    /// root itself, or at the end of the document
    pub fn insert_block_near_selection(&mut self, block: NodeKey) -> TreeResult<()> {
        let root = self.tree.root();
        match self.anchor() {
            Some(anchor) if anchor.key == root => self.tree.insert_at(root, anchor.offset, block),
            Some(anchor) => match self.tree.top_level(anchor.key) {
                Some(top) => self.tree.insert_after(top, block),
                None => self.tree.append(root, block),
            },
            None => self.tree.append(root, block),
        }
    }

    /// Deep copy of `key` keeping its block ids
    pub fn propagate(&mut self, key: NodeKey) -> TreeResult<NodeKey> {
        self.identity.propagate(&mut *self.tree, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_schema::violations;

    fn config() -> EditorConfig {
        EditorConfig::sequential("doc")
    }

    #[test]
    fn test_new_document_has_caret_in_paragraph() {
        let doc = Document::new(&config());
        let blocks = doc.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(doc.tree().kind(blocks[0]), Some(NodeKind::Paragraph));
        assert_eq!(
            doc.selection(),
            Some(Selection::caret(Point::new(blocks[0], 0)))
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_update_bumps_version_only_on_change() {
        let mut doc = Document::new(&config());
        doc.update(|_| {});
        assert_eq!(doc.version(), 0);

        doc.update(|tx| {
            let p = tx.create_paragraph();
            let root = tx.tree().root();
            tx.tree_mut().append(root, p).unwrap();
        });
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.blocks().len(), 2);
    }

    #[test]
    fn test_update_frees_detached_nodes() {
        let mut doc = Document::new(&config());
        let live = doc.tree().len();
        doc.update(|tx| {
            let stray = tx.create_paragraph_with_text("stray").unwrap();
            let first = tx.tree().children(tx.tree().root())[0];
            tx.tree_mut().detach(first).unwrap();
            let root = tx.tree().root();
            tx.tree_mut().append(root, stray).unwrap();
            tx.tree_mut().detach(stray).unwrap();
        });

        assert!(doc.blocks().is_empty());
        assert_eq!(doc.tree().len(), live - 1);
    }

    #[test]
    fn test_update_normalizes_before_returning() {
        let mut doc = Document::new(&config());
        doc.update(|tx| {
            let mcq = tx.create(NodeData::McqContainer);
            tx.insert_block_near_selection(mcq).unwrap();
        });

        assert!(violations(doc.tree()).is_empty());
        let mcq = doc.blocks()[1];
        assert_eq!(doc.tree().child_count(mcq), 3);
    }

    #[test]
    fn test_selection_repaired_when_node_removed() {
        let mut doc = Document::new(&config());
        let first = doc.blocks()[0];
        doc.update(|tx| {
            let p = tx.create_paragraph_with_text("last").unwrap();
            let root = tx.tree().root();
            tx.tree_mut().append(root, p).unwrap();
            tx.tree_mut().remove(first).unwrap();
        });

        let sel = doc.selection().unwrap();
        assert!(doc.tree().is_valid_point(&sel.anchor));
        assert_eq!(sel.anchor.offset, 4);
    }

    #[test]
    fn test_is_interactive_inside_closed_content() {
        let mut doc = Document::new(&config());
        let (body, title_p) = doc.update(|tx| {
            let container = tx.create(NodeData::CollapsibleContainer { open: false });
            let title = tx.create(NodeData::CollapsibleTitle);
            let title_p = tx.create_paragraph_with_text("title").unwrap();
            let content = tx.create(NodeData::CollapsibleContent);
            let body = tx.create_paragraph_with_text("body").unwrap();
            let tree = tx.tree_mut();
            tree.append(title, title_p).unwrap();
            tree.append(content, body).unwrap();
            tree.append(container, title).unwrap();
            tree.append(container, content).unwrap();
            tx.insert_block_near_selection(container).unwrap();
            (body, title_p)
        });

        assert!(!doc.is_interactive(body));
        assert!(doc.is_interactive(title_p));
    }

    #[test]
    fn test_set_selection_rejects_dangling_point() {
        let mut doc = Document::new(&config());
        let p = doc.blocks()[0];
        let bad = Selection::caret(Point::new(p, 7));
        assert!(doc.set_selection(Some(bad)).is_err());
    }

    #[test]
    fn test_snapshot_restore_keeps_ids() {
        let mut doc = Document::new(&config());
        let p = doc.blocks()[0];
        let id = doc.tree().block_id(p).cloned().unwrap();
        let snapshot = doc.snapshot();

        doc.update(|tx| tx.tree_mut().remove(p).unwrap());
        assert!(doc.find_block(&id).is_none());

        doc.restore(snapshot);
        assert_eq!(doc.find_block(&id), Some(p));
    }
}
