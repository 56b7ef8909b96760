use crate::node::{NodeData, TextRun};
use crate::tree::{ContentTree, NodeKey};

/// Visitor pattern for traversing a content tree immutably
///
/// Default implementations walk the entire subtree in document order.
/// Override specific visit_* methods to act on particular nodes; call
/// [`walk_node`] from an override to keep descending.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &ContentTree) {
        self.visit_node(tree, tree.root());
    }

    fn visit_node(&mut self, tree: &ContentTree, key: NodeKey) {
        walk_node(self, tree, key);
    }

    fn visit_text(&mut self, _tree: &ContentTree, _key: NodeKey, _run: &TextRun) {
        // Leaf node, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, tree: &ContentTree, key: NodeKey) {
    match tree.data(key) {
        Some(NodeData::Text(run)) => visitor.visit_text(tree, key, run),
        Some(_) => {
            for child in tree.children(key) {
                visitor.visit_node(tree, *child);
            }
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[derive(Default)]
    struct KindCounter {
        paragraphs: usize,
        text: String,
    }

    impl Visitor for KindCounter {
        fn visit_node(&mut self, tree: &ContentTree, key: NodeKey) {
            if tree.is_kind(key, NodeKind::Paragraph) {
                self.paragraphs += 1;
            }
            walk_node(self, tree, key);
        }

        fn visit_text(&mut self, _tree: &ContentTree, _key: NodeKey, run: &TextRun) {
            self.text.push_str(&run.text);
        }
    }

    #[test]
    fn test_visitor_walks_document_order() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        for word in ["one", "two"] {
            let p = tree.create(NodeData::Paragraph);
            let t = tree.create(NodeData::text(word));
            tree.append(p, t).unwrap();
            tree.append(root, p).unwrap();
        }

        let mut counter = KindCounter::default();
        counter.visit_tree(&tree);
        assert_eq!(counter.paragraphs, 2);
        assert_eq!(counter.text, "onetwo");
    }
}
