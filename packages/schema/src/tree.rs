//! # Content Tree
//!
//! Arena of content nodes addressed by generational [`NodeKey`]s.
//!
//! A key is the node's *position key*: it identifies a slot in this arena
//! only. It is never serialized and never used as block identity; a freed
//! slot bumps its generation so stale keys stop resolving.
//!
//! Every structural primitive records the nodes it touched (the node itself,
//! its old parent and its new parent) in a dirty set, which the editor's
//! normalizer drains after each transaction.

use crate::block_id::BlockId;
use crate::error::{TreeError, TreeResult};
use crate::node::{BlockStyle, NodeData, NodeKind};
use std::collections::BTreeSet;
use std::fmt;

/// Generational arena index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A content node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    data: NodeData,
    block_id: Option<BlockId>,
    style: BlockStyle,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Node {
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn block_id(&self) -> Option<&BlockId> {
        self.block_id.as_ref()
    }

    pub fn style(&self) -> &BlockStyle {
        &self.style
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed document tree with a single root
#[derive(Debug, Clone)]
pub struct ContentTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeKey,
    dirty: BTreeSet<NodeKey>,
    revision: u64,
}

impl ContentTree {
    /// Create a tree holding only the root node
    pub fn new() -> Self {
        let root_node = Node {
            data: NodeData::Root,
            block_id: None,
            style: BlockStyle::default(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root_node),
            }],
            free: Vec::new(),
            root: NodeKey {
                index: 0,
                generation: 0,
            },
            dirty: BTreeSet::new(),
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Monotonic counter bumped by every mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    // ---- lookup -------------------------------------------------------

    pub fn get(&self, key: NodeKey) -> Option<&Node> {
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node(&self, key: NodeKey) -> TreeResult<&Node> {
        self.get(key).ok_or(TreeError::NodeNotFound(key))
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    pub fn kind(&self, key: NodeKey) -> Option<NodeKind> {
        self.get(key).map(Node::kind)
    }

    pub fn is_kind(&self, key: NodeKey, kind: NodeKind) -> bool {
        self.kind(key) == Some(kind)
    }

    pub fn data(&self, key: NodeKey) -> Option<&NodeData> {
        self.get(key).map(Node::data)
    }

    pub fn block_id(&self, key: NodeKey) -> Option<&BlockId> {
        self.get(key).and_then(Node::block_id)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.get(key).and_then(Node::parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.get(key).map(Node::children).unwrap_or(&[])
    }

    pub fn child_count(&self, key: NodeKey) -> usize {
        self.children(key).len()
    }

    pub fn first_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).first().copied()
    }

    pub fn last_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).last().copied()
    }

    pub fn index_in_parent(&self, key: NodeKey) -> Option<usize> {
        let parent = self.parent(key)?;
        self.children(parent).iter().position(|c| *c == key)
    }

    pub fn next_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let index = self.index_in_parent(key)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn prev_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let index = self.index_in_parent(key)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Deepest first descendant, or `None` if `key` has no children
    pub fn first_descendant(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = self.first_child(key)?;
        while let Some(child) = self.first_child(current) {
            current = child;
        }
        Some(current)
    }

    /// Deepest last descendant, or `None` if `key` has no children
    pub fn last_descendant(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = self.last_child(key)?;
        while let Some(child) = self.last_child(current) {
            current = child;
        }
        Some(current)
    }

    /// Ancestors of `key`, nearest first (excluding `key`)
    pub fn ancestors(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut current = self.parent(key);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Nearest node, starting at `key` itself, whose kind matches
    pub fn find_ancestor(&self, key: NodeKey, kind: NodeKind) -> Option<NodeKey> {
        if self.is_kind(key, kind) {
            return Some(key);
        }
        self.ancestors(key)
            .into_iter()
            .find(|k| self.is_kind(*k, kind))
    }

    pub fn is_ancestor_of(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        self.ancestors(key).contains(&ancestor)
    }

    /// The root-level block that contains `key` (possibly `key` itself)
    pub fn top_level(&self, key: NodeKey) -> Option<NodeKey> {
        if key == self.root {
            return None;
        }
        let mut current = key;
        loop {
            let parent = self.parent(current)?;
            if parent == self.root {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Whether `key` is attached (directly or transitively) to the root
    pub fn is_attached(&self, key: NodeKey) -> bool {
        key == self.root || self.top_level(key).is_some()
    }

    /// All descendants of `key` in document order (excluding `key`)
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(key).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all text runs below `key`
    pub fn text_content(&self, key: NodeKey) -> String {
        match self.data(key) {
            Some(NodeData::Text(run)) => run.text.clone(),
            Some(NodeData::LineBreak) => "\n".to_string(),
            Some(_) => self
                .children(key)
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
            None => String::new(),
        }
    }

    /// Caret extent of `key`: characters for text, children for elements
    pub fn size(&self, key: NodeKey) -> usize {
        match self.data(key) {
            Some(NodeData::Text(run)) => run.len(),
            Some(_) => self.child_count(key),
            None => 0,
        }
    }

    // ---- construction -------------------------------------------------

    /// Create a detached node
    pub fn create(&mut self, data: NodeData) -> NodeKey {
        self.create_with(data, None, BlockStyle::default())
    }

    /// Create a detached node with an explicit block id and style
    pub fn create_with(
        &mut self,
        data: NodeData,
        block_id: Option<BlockId>,
        style: BlockStyle,
    ) -> NodeKey {
        let node = Node {
            data,
            block_id,
            style,
            parent: None,
            children: Vec::new(),
        };
        let key = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeKey {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeKey {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.touch(key);
        key
    }

    /// Deep copy of a subtree, detached; block ids are copied verbatim
    pub fn clone_subtree(&mut self, key: NodeKey) -> TreeResult<NodeKey> {
        let source = self.node(key)?.clone();
        let copy = self.create_with(source.data, source.block_id, source.style);
        for child in source.children {
            let child_copy = self.clone_subtree(child)?;
            self.link(copy, None, child_copy);
        }
        Ok(copy)
    }

    /// Deep copy of a subtree of `self` into `target`, detached there
    pub fn clone_into(&self, key: NodeKey, target: &mut ContentTree) -> TreeResult<NodeKey> {
        let source = self.node(key)?;
        let copy = target.create_with(
            source.data.clone(),
            source.block_id.clone(),
            source.style.clone(),
        );
        for child in source.children.iter() {
            let child_copy = self.clone_into(*child, target)?;
            target.link(copy, None, child_copy);
        }
        Ok(copy)
    }

    // ---- attribute mutation -------------------------------------------

    /// Mutable attributes of `key`; marks the node dirty
    pub fn data_mut(&mut self, key: NodeKey) -> Option<&mut NodeData> {
        if !self.contains(key) {
            return None;
        }
        self.touch(key);
        self.raw_mut(key).map(|n| &mut n.data)
    }

    pub fn set_block_id(&mut self, key: NodeKey, block_id: Option<BlockId>) -> TreeResult<()> {
        self.node(key)?;
        self.touch(key);
        if let Some(node) = self.raw_mut(key) {
            node.block_id = block_id;
        }
        Ok(())
    }

    pub fn set_style(&mut self, key: NodeKey, style: BlockStyle) -> TreeResult<()> {
        self.node(key)?;
        self.touch(key);
        if let Some(node) = self.raw_mut(key) {
            node.style = style;
        }
        Ok(())
    }

    // ---- structural mutation ------------------------------------------

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append(&mut self, parent: NodeKey, child: NodeKey) -> TreeResult<()> {
        let index = self.child_count(parent);
        self.insert_at(parent, index, child)
    }

    /// Insert `child` at `index` under `parent` (clamped), detaching it first
    pub fn insert_at(&mut self, parent: NodeKey, index: usize, child: NodeKey) -> TreeResult<()> {
        self.check_insert(parent, child)?;
        // Removing the child from the same parent shifts later indices.
        let adjusted = match (self.parent(child), self.index_in_parent(child)) {
            (Some(p), Some(i)) if p == parent && i < index => index - 1,
            _ => index,
        };
        self.unlink(child);
        self.link(parent, Some(adjusted), child);
        Ok(())
    }

    pub fn insert_before(&mut self, sibling: NodeKey, node: NodeKey) -> TreeResult<()> {
        let parent = self.parent(sibling).ok_or(TreeError::Detached(sibling))?;
        self.check_insert(parent, node)?;
        self.unlink(node);
        let index = self.index_in_parent(sibling).unwrap_or(0);
        self.link(parent, Some(index), node);
        Ok(())
    }

    pub fn insert_after(&mut self, sibling: NodeKey, node: NodeKey) -> TreeResult<()> {
        let parent = self.parent(sibling).ok_or(TreeError::Detached(sibling))?;
        self.check_insert(parent, node)?;
        self.unlink(node);
        let index = self
            .index_in_parent(sibling)
            .map(|i| i + 1)
            .unwrap_or_else(|| self.child_count(parent));
        self.link(parent, Some(index), node);
        Ok(())
    }

    /// Detach `key` from its parent, keeping the subtree alive
    pub fn detach(&mut self, key: NodeKey) -> TreeResult<()> {
        if key == self.root {
            return Err(TreeError::RootImmutable);
        }
        self.node(key)?;
        self.unlink(key);
        Ok(())
    }

    /// Detach `key` and free its whole subtree
    pub fn remove(&mut self, key: NodeKey) -> TreeResult<()> {
        self.detach(key)?;
        let mut doomed = self.descendants(key);
        doomed.push(key);
        for k in doomed {
            self.dirty.remove(&k);
            let slot = &mut self.slots[k.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(k.index);
        }
        self.revision += 1;
        Ok(())
    }

    /// Free every node no longer reachable from the root.
    ///
    /// Detached nodes are only meaningful inside the edit that made them; this
    /// runs once that edit is over so their slots can be reused. Returns the
    /// number of nodes freed.
    pub fn sweep_detached(&mut self) -> usize {
        let mut live = vec![false; self.slots.len()];
        live[self.root.index as usize] = true;
        for key in self.descendants(self.root) {
            live[key.index as usize] = true;
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if live[index] || slot.node.is_none() {
                continue;
            }
            let key = NodeKey {
                index: index as u32,
                generation: slot.generation,
            };
            self.dirty.remove(&key);
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index as u32);
            freed += 1;
        }
        freed
    }

    /// Put `replacement` where `old` stands, then free `old` and its subtree
    pub fn replace(&mut self, old: NodeKey, replacement: NodeKey) -> TreeResult<()> {
        self.insert_before(old, replacement)?;
        self.remove(old)
    }

    /// Move every child of `from` to the end of `to`
    pub fn move_children(&mut self, from: NodeKey, to: NodeKey) -> TreeResult<()> {
        let children: Vec<NodeKey> = self.children(from).to_vec();
        for child in children {
            self.append(to, child)?;
        }
        Ok(())
    }

    /// Replace `key` by its own children, in place
    pub fn unwrap(&mut self, key: NodeKey) -> TreeResult<()> {
        let children: Vec<NodeKey> = self.children(key).to_vec();
        for child in children {
            self.insert_before(key, child)?;
        }
        self.remove(key)
    }

    // ---- dirty tracking -----------------------------------------------

    pub fn mark_dirty(&mut self, key: NodeKey) {
        if self.contains(key) {
            self.dirty.insert(key);
        }
    }

    /// Mark every live node dirty (used after import)
    pub fn mark_all_dirty(&mut self) {
        let keys: Vec<NodeKey> = self.descendants(self.root);
        self.dirty.insert(self.root);
        self.dirty.extend(keys);
    }

    /// Drain the dirty set, returning only keys that are still alive
    pub fn take_dirty(&mut self) -> Vec<NodeKey> {
        let drained = std::mem::take(&mut self.dirty);
        drained.into_iter().filter(|k| self.contains(*k)).collect()
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    // ---- internals ----------------------------------------------------

    fn raw_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn touch(&mut self, key: NodeKey) {
        self.dirty.insert(key);
        self.revision += 1;
    }

    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> TreeResult<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if child == self.root {
            return Err(TreeError::RootImmutable);
        }
        if !parent_node.kind().accepts_children() {
            return Err(TreeError::NotAnElement(parent));
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(TreeError::CycleDetected);
        }
        Ok(())
    }

    fn unlink(&mut self, key: NodeKey) {
        let Some(parent) = self.parent(key) else {
            return;
        };
        if let Some(p) = self.raw_mut(parent) {
            p.children.retain(|c| *c != key);
        }
        if let Some(n) = self.raw_mut(key) {
            n.parent = None;
        }
        self.touch(parent);
        self.touch(key);
    }

    fn link(&mut self, parent: NodeKey, index: Option<usize>, child: NodeKey) {
        if let Some(p) = self.raw_mut(parent) {
            let at = index.unwrap_or(p.children.len()).min(p.children.len());
            p.children.insert(at, child);
        }
        if let Some(n) = self.raw_mut(child) {
            n.parent = Some(parent);
        }
        self.touch(parent);
        self.touch(child);
    }
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_with_text(tree: &mut ContentTree, text: &str) -> NodeKey {
        let p = tree.create(NodeData::Paragraph);
        let t = tree.create(NodeData::text(text));
        tree.append(p, t).unwrap();
        p
    }

    #[test]
    fn test_append_and_navigate() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = paragraph_with_text(&mut tree, "a");
        let b = paragraph_with_text(&mut tree, "b");
        tree.append(root, a).unwrap();
        tree.append(root, b).unwrap();

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.prev_sibling(a), None);
        assert_eq!(tree.text_content(root), "ab");
        assert_eq!(tree.top_level(tree.first_descendant(b).unwrap()), Some(b));
    }

    #[test]
    fn test_removed_keys_do_not_resolve() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = paragraph_with_text(&mut tree, "a");
        tree.append(root, a).unwrap();
        let text = tree.first_child(a).unwrap();

        tree.remove(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(text));

        // Slot reuse hands out a new generation
        let b = tree.create(NodeData::Paragraph);
        assert_ne!(a, b);
        assert!(!tree.contains(a));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_sweep_frees_only_detached_nodes() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let kept = paragraph_with_text(&mut tree, "kept");
        tree.append(root, kept).unwrap();
        let dropped = paragraph_with_text(&mut tree, "dropped");
        tree.append(root, dropped).unwrap();
        tree.detach(dropped).unwrap();
        let revision = tree.revision();

        assert_eq!(tree.sweep_detached(), 2);
        assert!(!tree.contains(dropped));
        assert!(tree.contains(kept));
        assert_eq!(tree.text_content(root), "kept");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.revision(), revision);
        assert_eq!(tree.sweep_detached(), 0);
    }

    #[test]
    fn test_cycle_detection() {
        let mut tree = ContentTree::new();
        let outer = tree.create(NodeData::Quote);
        let inner = tree.create(NodeData::Paragraph);
        tree.append(outer, inner).unwrap();

        assert_eq!(tree.append(inner, outer), Err(TreeError::CycleDetected));
        assert_eq!(tree.append(outer, outer), Err(TreeError::CycleDetected));
    }

    #[test]
    fn test_leaf_rejects_children() {
        let mut tree = ContentTree::new();
        let text = tree.create(NodeData::text("x"));
        let p = tree.create(NodeData::Paragraph);
        assert_eq!(tree.append(text, p), Err(TreeError::NotAnElement(text)));
    }

    #[test]
    fn test_insert_at_within_same_parent() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let a = tree.create(NodeData::Paragraph);
        let b = tree.create(NodeData::Paragraph);
        let c = tree.create(NodeData::Paragraph);
        for k in [a, b, c] {
            tree.append(root, k).unwrap();
        }

        // Move `a` to sit after `b`
        tree.insert_at(root, 2, a).unwrap();
        assert_eq!(tree.children(root), &[b, a, c]);
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let before = tree.create(NodeData::Paragraph);
        let wrapper = tree.create(NodeData::CollapsibleContent);
        let x = tree.create(NodeData::Paragraph);
        let y = tree.create(NodeData::Paragraph);
        tree.append(root, before).unwrap();
        tree.append(root, wrapper).unwrap();
        tree.append(wrapper, x).unwrap();
        tree.append(wrapper, y).unwrap();

        tree.unwrap(wrapper).unwrap();
        assert_eq!(tree.children(root), &[before, x, y]);
        assert!(!tree.contains(wrapper));
    }

    #[test]
    fn test_clone_subtree_copies_block_ids() {
        let mut tree = ContentTree::new();
        let p = tree.create_with(
            NodeData::Paragraph,
            Some(BlockId::new("b-1")),
            BlockStyle::default(),
        );
        let t = tree.create(NodeData::text("hi"));
        tree.append(p, t).unwrap();

        let copy = tree.clone_subtree(p).unwrap();
        assert_ne!(copy, p);
        assert_eq!(tree.block_id(copy), Some(&BlockId::new("b-1")));
        assert_eq!(tree.text_content(copy), "hi");
        assert_eq!(tree.parent(copy), None);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.take_dirty();

        let p = tree.create(NodeData::Paragraph);
        tree.append(root, p).unwrap();
        let dirty = tree.take_dirty();
        assert!(dirty.contains(&root));
        assert!(dirty.contains(&p));
        assert!(!tree.has_dirty());

        tree.remove(p).unwrap();
        assert_eq!(tree.take_dirty(), vec![root]);
    }
}
