//! Read-only check of the composite shape rules.
//!
//! The editor's normalizer repairs these; this module only reports them, so
//! tests and tooling can assert that a tree is valid between transactions.

use crate::block_id::BlockId;
use crate::node::{NodeKind, MAX_OPTIONS, MIN_OPTIONS};
use crate::tree::{ContentTree, NodeKey};
use crate::visitor::{walk_node, Visitor};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeViolation {
    /// A composite part found outside its required container
    Misplaced { key: NodeKey, kind: NodeKind },
    /// MCQ container children are not `[question, options, explanation]`
    McqShape { key: NodeKey },
    /// Options container holds a non-option child
    NonOption { key: NodeKey, child: NodeKind },
    /// Options container outside `[MIN_OPTIONS, MAX_OPTIONS]`
    OptionCount { key: NodeKey, count: usize },
    /// Collapsible container children are not `[title, content]`
    CollapsibleShape { key: NodeKey },
    /// Collapsible title with no children
    EmptyTitle { key: NodeKey },
    /// Question, option or explanation with no children
    EmptyShadowRoot { key: NodeKey, kind: NodeKind },
    /// Trackable node without a block id
    MissingBlockId { key: NodeKey, kind: NodeKind },
    /// Two live nodes share a block id
    DuplicateBlockId { id: BlockId },
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeViolation::Misplaced { key, kind } => write!(f, "{} {} is misplaced", kind, key),
            ShapeViolation::McqShape { key } => write!(f, "mcq container {} has wrong parts", key),
            ShapeViolation::NonOption { key, child } => {
                write!(f, "options container {} holds a {}", key, child)
            }
            ShapeViolation::OptionCount { key, count } => {
                write!(f, "options container {} holds {} options", key, count)
            }
            ShapeViolation::CollapsibleShape { key } => {
                write!(f, "collapsible container {} has wrong parts", key)
            }
            ShapeViolation::EmptyTitle { key } => write!(f, "collapsible title {} is empty", key),
            ShapeViolation::EmptyShadowRoot { key, kind } => write!(f, "{} {} is empty", kind, key),
            ShapeViolation::MissingBlockId { key, kind } => {
                write!(f, "{} {} has no block id", kind, key)
            }
            ShapeViolation::DuplicateBlockId { id } => write!(f, "block id {} is shared", id),
        }
    }
}

/// Every shape rule the tree currently breaks
pub fn violations(tree: &ContentTree) -> Vec<ShapeViolation> {
    let mut checker = ShapeChecker::default();
    checker.visit_tree(tree);
    checker.found
}

#[derive(Default)]
struct ShapeChecker {
    found: Vec<ShapeViolation>,
    seen_ids: HashSet<BlockId>,
}

impl ShapeChecker {
    fn check(&mut self, tree: &ContentTree, key: NodeKey) {
        let Some(kind) = tree.kind(key) else {
            return;
        };
        let parent_kind = tree.parent(key).and_then(|p| tree.kind(p));
        let children: Vec<NodeKind> = tree
            .children(key)
            .iter()
            .filter_map(|c| tree.kind(*c))
            .collect();

        let required_parent = match kind {
            NodeKind::McqQuestion | NodeKind::McqOptions | NodeKind::McqExplanation => {
                Some(NodeKind::McqContainer)
            }
            NodeKind::McqOption => Some(NodeKind::McqOptions),
            NodeKind::CollapsibleTitle | NodeKind::CollapsibleContent => {
                Some(NodeKind::CollapsibleContainer)
            }
            _ => None,
        };
        if let Some(required) = required_parent {
            if parent_kind != Some(required) {
                self.found.push(ShapeViolation::Misplaced { key, kind });
            }
        }

        match kind {
            NodeKind::McqContainer => {
                if children
                    != [
                        NodeKind::McqQuestion,
                        NodeKind::McqOptions,
                        NodeKind::McqExplanation,
                    ]
                {
                    self.found.push(ShapeViolation::McqShape { key });
                }
            }
            NodeKind::McqOptions => {
                if let Some(child) = children.iter().find(|k| **k != NodeKind::McqOption) {
                    self.found.push(ShapeViolation::NonOption { key, child: *child });
                }
                let count = children.iter().filter(|k| **k == NodeKind::McqOption).count();
                if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
                    self.found.push(ShapeViolation::OptionCount { key, count });
                }
            }
            NodeKind::CollapsibleContainer => {
                if children != [NodeKind::CollapsibleTitle, NodeKind::CollapsibleContent] {
                    self.found.push(ShapeViolation::CollapsibleShape { key });
                }
            }
            NodeKind::CollapsibleTitle if children.is_empty() => {
                self.found.push(ShapeViolation::EmptyTitle { key });
            }
            NodeKind::McqQuestion | NodeKind::McqOption | NodeKind::McqExplanation
                if children.is_empty() =>
            {
                self.found.push(ShapeViolation::EmptyShadowRoot { key, kind });
            }
            _ => {}
        }

        if kind.is_trackable() {
            match tree.block_id(key) {
                None => self.found.push(ShapeViolation::MissingBlockId { key, kind }),
                Some(id) => {
                    if !self.seen_ids.insert(id.clone()) {
                        self.found
                            .push(ShapeViolation::DuplicateBlockId { id: id.clone() });
                    }
                }
            }
        }
    }
}

impl Visitor for ShapeChecker {
    fn visit_node(&mut self, tree: &ContentTree, key: NodeKey) {
        self.check(tree, key);
        walk_node(self, tree, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BlockStyle, NodeData};

    fn tracked(tree: &mut ContentTree, data: NodeData, id: &str) -> NodeKey {
        tree.create_with(data, Some(BlockId::new(id)), BlockStyle::default())
    }

    #[test]
    fn test_valid_collapsible_has_no_violations() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let container = tracked(&mut tree, NodeData::CollapsibleContainer { open: true }, "c");
        let title = tracked(&mut tree, NodeData::CollapsibleTitle, "t");
        let content = tracked(&mut tree, NodeData::CollapsibleContent, "n");
        let p = tracked(&mut tree, NodeData::Paragraph, "p");
        tree.append(root, container).unwrap();
        tree.append(container, title).unwrap();
        tree.append(container, content).unwrap();
        tree.append(title, p).unwrap();

        assert!(violations(&tree).is_empty());
    }

    #[test]
    fn test_reports_misplaced_and_missing_ids() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let content = tree.create(NodeData::CollapsibleContent);
        tree.append(root, content).unwrap();

        let found = violations(&tree);
        assert!(found.contains(&ShapeViolation::Misplaced {
            key: content,
            kind: NodeKind::CollapsibleContent
        }));
        assert!(found.contains(&ShapeViolation::MissingBlockId {
            key: content,
            kind: NodeKind::CollapsibleContent
        }));
    }

    #[test]
    fn test_reports_option_count_and_duplicates() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let options = tracked(&mut tree, NodeData::McqOptions, "o");
        let only = tracked(&mut tree, NodeData::McqOption { checked: false }, "dup");
        let p = tracked(&mut tree, NodeData::Paragraph, "dup");
        tree.append(root, options).unwrap();
        tree.append(options, only).unwrap();
        tree.append(only, p).unwrap();

        let found = violations(&tree);
        assert!(found.contains(&ShapeViolation::OptionCount {
            key: options,
            count: 1
        }));
        assert!(found.contains(&ShapeViolation::DuplicateBlockId {
            id: BlockId::new("dup")
        }));
    }
}
