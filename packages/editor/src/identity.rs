//! # Block Identity Overlay
//!
//! Every trackable node carries a persistent [`BlockId`] that the ownership
//! backend keys on. Ids are minted only when a node is built fresh or
//! imported without one; copies made through [`BlockIdentity::propagate`]
//! keep the ids they were copied from, which is what keeps undo snapshots and
//! drag clones from churning identities.

use coursekit_common::IdGenerator;
use coursekit_schema::{BlockId, ContentTree, NodeData, NodeKey, TreeResult, Visitor};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct BlockIdentity {
    ids: IdGenerator,
}

impl BlockIdentity {
    pub fn new(ids: IdGenerator) -> Self {
        Self { ids }
    }

    /// Fresh id, never issued before by this overlay
    pub fn mint(&mut self) -> BlockId {
        BlockId::new(self.ids.new_id())
    }

    /// Record an id that already lives in a document so `mint` never repeats it
    pub fn reserve(&mut self, id: &BlockId) {
        self.ids.reserve(id.as_str());
    }

    /// Number of ids minted so far
    pub fn minted(&self) -> u64 {
        self.ids.issued()
    }

    /// Create a detached node, minting an id if its kind is trackable
    pub fn create(&mut self, tree: &mut ContentTree, data: NodeData) -> NodeKey {
        let block_id = data.kind().is_trackable().then(|| self.mint());
        tree.create_with(data, block_id, Default::default())
    }

    /// Replacement rule: a trackable node without an id gets one.
    ///
    /// Returns true if an id was minted.
    pub fn track(&mut self, tree: &mut ContentTree, key: NodeKey) -> TreeResult<bool> {
        let node = tree.node(key)?;
        if !node.kind().is_trackable() || node.block_id().is_some() {
            return Ok(false);
        }
        let id = self.mint();
        tree.set_block_id(key, Some(id))?;
        Ok(true)
    }

    /// Deep copy of `key` within the same tree; ids are carried over verbatim
    pub fn propagate(&self, tree: &mut ContentTree, key: NodeKey) -> TreeResult<NodeKey> {
        tree.clone_subtree(key)
    }

    /// Deep copy of `key` from `source` into `target`; ids are carried over verbatim
    pub fn propagate_into(
        &self,
        source: &ContentTree,
        key: NodeKey,
        target: &mut ContentTree,
    ) -> TreeResult<NodeKey> {
        source.clone_into(key, target)
    }

    /// Id for a node rebuilt from a payload: the payload's id, or a fresh one
    /// when it is absent or empty
    pub fn restore(&mut self, serialized: Option<&str>) -> BlockId {
        match serialized {
            Some(id) if !id.is_empty() => BlockId::new(id),
            _ => self.mint(),
        }
    }
}

/// Map every block id in the attached tree to the node carrying it
pub fn block_index(tree: &ContentTree) -> HashMap<BlockId, NodeKey> {
    let mut indexer = BlockIndexer::default();
    indexer.visit_tree(tree);
    indexer.index
}

#[derive(Default)]
struct BlockIndexer {
    index: HashMap<BlockId, NodeKey>,
}

impl Visitor for BlockIndexer {
    fn visit_node(&mut self, tree: &ContentTree, key: NodeKey) {
        if let Some(id) = tree.block_id(key) {
            self.index.insert(id.clone(), key);
        }
        coursekit_schema::walk_node(self, tree, key);
    }
}
