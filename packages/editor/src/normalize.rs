//! # Structural Invariant Enforcer
//!
//! Every primitive edit marks the nodes it touched (plus their parent) dirty.
//! When an update transaction closes, the [`Normalizer`] drains the dirty set
//! and offers each live, attached node to every registered transform, then
//! repeats with whatever the transforms themselves touched until nothing
//! changes.
//!
//! Transforms are:
//! - **Local**: they only look at one node and its immediate neighbourhood
//! - **Conservative**: content is relocated, never discarded
//! - **Idempotent**: a transform returns `false` when its rule already holds
//!
//! The order of the transform list matters only for efficiency; any order
//! reaches the same fixpoint.

use crate::identity::BlockIdentity;
use coursekit_schema::{
    ContentTree, NodeData, NodeKey, NodeKind, TreeResult, MAX_OPTIONS, MIN_OPTIONS,
};
use tracing::{debug, warn};

/// Passes after which normalization gives up and logs
const MAX_PASSES: usize = 64;

/// One shape rule, applied to a single dirty node
pub trait NodeTransform: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether this transform is interested in nodes of `kind`
    fn applies_to(&self, kind: NodeKind) -> bool;

    /// Enforce the rule at `key`; returns true if the tree changed
    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool>;
}

fn parent_is(tree: &ContentTree, key: NodeKey, kind: NodeKind) -> bool {
    tree.parent(key).map_or(false, |p| tree.is_kind(p, kind))
}

fn new_paragraph(tree: &mut ContentTree, identity: &mut BlockIdentity) -> NodeKey {
    identity.create(tree, NodeData::Paragraph)
}

/// Shadow root `data` holding one empty paragraph
fn seeded(tree: &mut ContentTree, identity: &mut BlockIdentity, data: NodeData) -> TreeResult<NodeKey> {
    let node = identity.create(tree, data);
    let paragraph = new_paragraph(tree, identity);
    tree.append(node, paragraph)?;
    Ok(node)
}

/// Collapsible content outside its container is unwrapped in place
#[derive(Debug)]
pub struct UnwrapOrphanedContent;

impl NodeTransform for UnwrapOrphanedContent {
    fn name(&self) -> &'static str {
        "unwrap-orphaned-content"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::CollapsibleContent
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        _identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        if parent_is(tree, key, NodeKind::CollapsibleContainer) {
            return Ok(false);
        }
        tree.unwrap(key)?;
        Ok(true)
    }
}

/// A title outside its container becomes a plain paragraph with the same children
#[derive(Debug)]
pub struct ConvertOrphanedTitle;

impl NodeTransform for ConvertOrphanedTitle {
    fn name(&self) -> &'static str {
        "convert-orphaned-title"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::CollapsibleTitle
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        if parent_is(tree, key, NodeKind::CollapsibleContainer) {
            return Ok(false);
        }
        let paragraph = new_paragraph(tree, identity);
        tree.insert_before(key, paragraph)?;
        tree.move_children(key, paragraph)?;
        tree.remove(key)?;
        Ok(true)
    }
}

/// A title with no children is removed; its container then dissolves
#[derive(Debug)]
pub struct RemoveEmptyTitle;

impl NodeTransform for RemoveEmptyTitle {
    fn name(&self) -> &'static str {
        "remove-empty-title"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::CollapsibleTitle
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        _identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        if tree.child_count(key) > 0 {
            return Ok(false);
        }
        tree.remove(key)?;
        Ok(true)
    }
}

/// A collapsible container must hold exactly `[Title, Content]`, otherwise its
/// children are promoted and the container goes away
#[derive(Debug)]
pub struct DissolveCollapsible;

impl NodeTransform for DissolveCollapsible {
    fn name(&self) -> &'static str {
        "dissolve-collapsible"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::CollapsibleContainer
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        _identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        let kinds: Vec<Option<NodeKind>> =
            tree.children(key).iter().map(|c| tree.kind(*c)).collect();
        if kinds == [Some(NodeKind::CollapsibleTitle), Some(NodeKind::CollapsibleContent)] {
            return Ok(false);
        }
        tree.unwrap(key)?;
        Ok(true)
    }
}

/// Quiz parts outside their expected parent are unwrapped in place
#[derive(Debug)]
pub struct UnwrapOrphanedMcqPart;

impl NodeTransform for UnwrapOrphanedMcqPart {
    fn name(&self) -> &'static str {
        "unwrap-orphaned-mcq-part"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind.is_mcq_part() || kind == NodeKind::McqOption
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        _identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        let expected = match tree.kind(key) {
            Some(NodeKind::McqOption) => NodeKind::McqOptions,
            _ => NodeKind::McqContainer,
        };
        if parent_is(tree, key, expected) {
            return Ok(false);
        }
        tree.unwrap(key)?;
        Ok(true)
    }
}

/// An MCQ container must hold exactly `[Question, Options, Explanation]`.
///
/// A container holding only quiz parts, at most one of each, is put back in
/// order with missing parts rebuilt; anything else is dissolved.
#[derive(Debug)]
pub struct RepairMcqContainer;

const MCQ_PARTS: [NodeKind; 3] = [
    NodeKind::McqQuestion,
    NodeKind::McqOptions,
    NodeKind::McqExplanation,
];

impl RepairMcqContainer {
    fn default_part(
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        kind: NodeKind,
    ) -> TreeResult<NodeKey> {
        match kind {
            NodeKind::McqQuestion => seeded(tree, identity, NodeData::McqQuestion),
            NodeKind::McqExplanation => seeded(tree, identity, NodeData::McqExplanation),
            _ => {
                let options = identity.create(tree, NodeData::McqOptions);
                for _ in 0..MIN_OPTIONS {
                    let option = seeded(tree, identity, NodeData::McqOption { checked: false })?;
                    tree.append(options, option)?;
                }
                Ok(options)
            }
        }
    }
}

impl NodeTransform for RepairMcqContainer {
    fn name(&self) -> &'static str {
        "repair-mcq-container"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::McqContainer
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        let children: Vec<NodeKey> = tree.children(key).to_vec();
        let kinds: Vec<Option<NodeKind>> = children.iter().map(|c| tree.kind(*c)).collect();
        if kinds == MCQ_PARTS.map(Some) {
            return Ok(false);
        }

        let reconstructible = kinds.iter().all(|k| k.map_or(false, |k| k.is_mcq_part()))
            && MCQ_PARTS
                .iter()
                .all(|part| kinds.iter().filter(|k| **k == Some(*part)).count() <= 1);
        if !reconstructible {
            tree.unwrap(key)?;
            return Ok(true);
        }

        for part in MCQ_PARTS {
            let existing = children
                .iter()
                .copied()
                .find(|c| tree.is_kind(*c, part));
            let node = match existing {
                Some(node) => node,
                None => Self::default_part(tree, identity, part)?,
            };
            tree.append(key, node)?;
        }
        Ok(true)
    }
}

/// The options container holds only options, between two and four of them
#[derive(Debug)]
pub struct RepairOptions;

impl NodeTransform for RepairOptions {
    fn name(&self) -> &'static str {
        "repair-options"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind == NodeKind::McqOptions
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        let mut changed = false;

        let strays: Vec<NodeKey> = tree
            .children(key)
            .iter()
            .copied()
            .filter(|c| !tree.is_kind(*c, NodeKind::McqOption))
            .collect();
        for stray in strays {
            let option = identity.create(tree, NodeData::McqOption { checked: false });
            tree.insert_before(stray, option)?;
            tree.append(option, stray)?;
            changed = true;
        }

        while tree.child_count(key) < MIN_OPTIONS {
            let option = seeded(tree, identity, NodeData::McqOption { checked: false })?;
            tree.append(key, option)?;
            changed = true;
        }

        let options: Vec<NodeKey> = tree.children(key).to_vec();
        if options.len() > MAX_OPTIONS {
            let last_kept = options[MAX_OPTIONS - 1];
            for surplus in &options[MAX_OPTIONS..] {
                tree.move_children(*surplus, last_kept)?;
                tree.remove(*surplus)?;
            }
            changed = true;
        }

        Ok(changed)
    }
}

/// Question, option and explanation never sit empty
#[derive(Debug)]
pub struct SeedShadowRoot;

impl NodeTransform for SeedShadowRoot {
    fn name(&self) -> &'static str {
        "seed-shadow-root"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        matches!(
            kind,
            NodeKind::McqQuestion | NodeKind::McqOption | NodeKind::McqExplanation
        )
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        if tree.child_count(key) > 0 {
            return Ok(false);
        }
        let paragraph = new_paragraph(tree, identity);
        tree.append(key, paragraph)?;
        Ok(true)
    }
}

/// Trackable nodes always carry a block id
#[derive(Debug)]
pub struct TrackBlocks;

impl NodeTransform for TrackBlocks {
    fn name(&self) -> &'static str {
        "track-blocks"
    }

    fn applies_to(&self, kind: NodeKind) -> bool {
        kind.is_trackable()
    }

    fn apply(
        &self,
        tree: &mut ContentTree,
        identity: &mut BlockIdentity,
        key: NodeKey,
    ) -> TreeResult<bool> {
        identity.track(tree, key)
    }
}

/// Summary of one normalization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub passes: usize,
    pub repairs: usize,
}

/// Drives the registered transforms to a fixpoint over the dirty set
#[derive(Debug)]
pub struct Normalizer {
    transforms: Vec<Box<dyn NodeTransform>>,
}

impl Normalizer {
    /// Normalizer with every built-in shape rule
    pub fn new() -> Self {
        Self {
            transforms: vec![
                Box::new(UnwrapOrphanedContent),
                Box::new(ConvertOrphanedTitle),
                Box::new(RemoveEmptyTitle),
                Box::new(DissolveCollapsible),
                Box::new(UnwrapOrphanedMcqPart),
                Box::new(RepairMcqContainer),
                Box::new(RepairOptions),
                Box::new(SeedShadowRoot),
                Box::new(TrackBlocks),
            ],
        }
    }

    pub fn with_transforms(transforms: Vec<Box<dyn NodeTransform>>) -> Self {
        Self { transforms }
    }

    pub fn register(&mut self, transform: Box<dyn NodeTransform>) {
        self.transforms.push(transform);
    }

    pub fn transform_names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }

    /// Normalize every dirty node until no transform applies
    pub fn run(&self, tree: &mut ContentTree, identity: &mut BlockIdentity) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        while tree.has_dirty() {
            if report.passes == MAX_PASSES {
                warn!(
                    passes = report.passes,
                    repairs = report.repairs,
                    "Normalization did not settle, giving up"
                );
                tree.take_dirty();
                break;
            }
            report.passes += 1;

            for key in tree.take_dirty() {
                if !tree.is_attached(key) {
                    continue;
                }
                for transform in &self.transforms {
                    // An earlier transform may have removed or replaced the node.
                    let Some(kind) = tree.kind(key) else { break };
                    if !transform.applies_to(kind) {
                        continue;
                    }
                    match transform.apply(tree, identity, key) {
                        Ok(true) => {
                            report.repairs += 1;
                            debug!(transform = transform.name(), node = %key, kind = %kind, "Repaired node");
                        }
                        Ok(false) => {}
                        Err(e) => {
                            warn!(transform = transform.name(), node = %key, error = %e, "Transform failed");
                        }
                    }
                }
            }
        }

        report
    }

    /// Normalize the whole attached tree, not just the dirty set
    pub fn run_all(&self, tree: &mut ContentTree, identity: &mut BlockIdentity) -> NormalizeReport {
        tree.mark_all_dirty();
        self.run(tree, identity)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_common::IdGenerator;
    use coursekit_schema::violations;

    fn setup() -> (ContentTree, BlockIdentity, Normalizer) {
        (
            ContentTree::new(),
            BlockIdentity::new(IdGenerator::sequential("n")),
            Normalizer::new(),
        )
    }

    fn paragraph_with(tree: &mut ContentTree, ids: &mut BlockIdentity, text: &str) -> NodeKey {
        let p = ids.create(tree, NodeData::Paragraph);
        let t = tree.create(NodeData::text(text));
        tree.append(p, t).unwrap();
        p
    }

    #[test]
    fn test_engine_creation() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.transform_names().len(), 9);
    }

    #[test]
    fn test_orphaned_content_is_unwrapped() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let content = ids.create(&mut tree, NodeData::CollapsibleContent);
        let p = paragraph_with(&mut tree, &mut ids, "kept");
        tree.append(content, p).unwrap();
        tree.append(root, content).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert!(!tree.contains(content));
        assert_eq!(tree.children(root), &[p]);
        assert_eq!(tree.text_content(root), "kept");
    }

    #[test]
    fn test_orphaned_title_becomes_paragraph() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let title = ids.create(&mut tree, NodeData::CollapsibleTitle);
        let p = paragraph_with(&mut tree, &mut ids, "heading");
        tree.append(title, p).unwrap();
        tree.append(root, title).unwrap();

        normalizer.run(&mut tree, &mut ids);

        let top = tree.first_child(root).unwrap();
        assert_eq!(tree.kind(top), Some(NodeKind::Paragraph));
        assert_eq!(tree.children(top), &[p]);
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_container_missing_content_dissolves() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::CollapsibleContainer { open: true });
        let title = ids.create(&mut tree, NodeData::CollapsibleTitle);
        let p = paragraph_with(&mut tree, &mut ids, "t");
        tree.append(title, p).unwrap();
        tree.append(container, title).unwrap();
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert!(!tree.contains(container));
        assert!(!tree.contains(title));
        assert_eq!(tree.text_content(root), "t");
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_empty_title_removed_then_container_dissolves() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::CollapsibleContainer { open: false });
        let title = ids.create(&mut tree, NodeData::CollapsibleTitle);
        let content = ids.create(&mut tree, NodeData::CollapsibleContent);
        let p = paragraph_with(&mut tree, &mut ids, "body");
        tree.append(content, p).unwrap();
        tree.append(container, title).unwrap();
        tree.append(container, content).unwrap();
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert_eq!(tree.children(root), &[p]);
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_mcq_parts_reordered_and_completed() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::McqContainer);
        let explanation = ids.create(&mut tree, NodeData::McqExplanation);
        let question = ids.create(&mut tree, NodeData::McqQuestion);
        tree.append(container, explanation).unwrap();
        tree.append(container, question).unwrap();
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        let kinds: Vec<_> = tree
            .children(container)
            .iter()
            .filter_map(|c| tree.kind(*c))
            .collect();
        assert_eq!(kinds, MCQ_PARTS.to_vec());
        assert_eq!(tree.children(container)[0], question);
        assert_eq!(tree.children(container)[2], explanation);
        let options = tree.children(container)[1];
        assert_eq!(tree.child_count(options), MIN_OPTIONS);
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_mcq_with_foreign_child_dissolves() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::McqContainer);
        let question = ids.create(&mut tree, NodeData::McqQuestion);
        let q = paragraph_with(&mut tree, &mut ids, "q");
        tree.append(question, q).unwrap();
        let stray = paragraph_with(&mut tree, &mut ids, "stray");
        tree.append(container, question).unwrap();
        tree.append(container, stray).unwrap();
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        // The question is unwrapped once it loses its container.
        assert_eq!(tree.children(root), &[q, stray]);
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_options_wrap_pad_and_merge() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::McqContainer);
        let question = ids.create(&mut tree, NodeData::McqQuestion);
        let options = ids.create(&mut tree, NodeData::McqOptions);
        let explanation = ids.create(&mut tree, NodeData::McqExplanation);
        for part in [question, options, explanation] {
            tree.append(container, part).unwrap();
        }
        for label in ["a", "b", "c", "d", "e", "f"] {
            let option = ids.create(&mut tree, NodeData::McqOption { checked: false });
            let p = paragraph_with(&mut tree, &mut ids, label);
            tree.append(option, p).unwrap();
            tree.append(options, option).unwrap();
        }
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert_eq!(tree.child_count(options), MAX_OPTIONS);
        assert_eq!(tree.text_content(options), "abcdef");
        let last = tree.last_child(options).unwrap();
        assert_eq!(tree.text_content(last), "def");
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_stray_option_child_is_wrapped() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::McqContainer);
        let options = ids.create(&mut tree, NodeData::McqOptions);
        let stray = paragraph_with(&mut tree, &mut ids, "loose");
        tree.append(options, stray).unwrap();
        tree.append(container, options).unwrap();
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);

        let first = tree.first_child(options).unwrap();
        assert_eq!(tree.kind(first), Some(NodeKind::McqOption));
        assert_eq!(tree.children(first), &[stray]);
        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_tracking_rule_mints_missing_ids() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let p = tree.create(NodeData::Paragraph);
        tree.append(root, p).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert!(tree.block_id(p).is_some());
    }

    #[test]
    fn test_idempotent() {
        let (mut tree, mut ids, normalizer) = setup();
        let root = tree.root();
        let container = ids.create(&mut tree, NodeData::McqContainer);
        tree.append(root, container).unwrap();

        normalizer.run(&mut tree, &mut ids);
        let revision = tree.revision();
        let second = normalizer.run_all(&mut tree, &mut ids);

        assert_eq!(second.repairs, 0);
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn test_detached_nodes_are_left_alone() {
        let (mut tree, mut ids, normalizer) = setup();
        let content = ids.create(&mut tree, NodeData::CollapsibleContent);
        let p = paragraph_with(&mut tree, &mut ids, "x");
        tree.append(content, p).unwrap();

        normalizer.run(&mut tree, &mut ids);

        assert!(tree.contains(content));
        assert_eq!(tree.parent(p), Some(content));
    }
}
