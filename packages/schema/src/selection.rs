//! Caret and range selections over a [`ContentTree`].
//!
//! A point sits either inside a text run (offset in characters) or inside an
//! element (offset in children), the same convention the editing engine uses.

use crate::node::NodeData;
use crate::tree::{ContentTree, NodeKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
}

impl Point {
    pub fn new(key: NodeKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    /// Collapsed selection at `point`
    pub fn caret(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

impl ContentTree {
    /// Point at the very start of `key`'s content
    pub fn start_point(&self, key: NodeKey) -> Point {
        let target = self.first_descendant(key).unwrap_or(key);
        self.leaf_point(target, false)
    }

    /// Point at the very end of `key`'s content
    pub fn end_point(&self, key: NodeKey) -> Point {
        let target = self.last_descendant(key).unwrap_or(key);
        self.leaf_point(target, true)
    }

    /// Whether `point` still resolves inside this tree
    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.is_attached(point.key) && point.offset <= self.size(point.key)
    }

    fn leaf_point(&self, key: NodeKey, at_end: bool) -> Point {
        match self.data(key) {
            Some(NodeData::Text(run)) => Point::new(key, if at_end { run.len() } else { 0 }),
            Some(data) if data.kind().accepts_children() => {
                Point::new(key, if at_end { self.child_count(key) } else { 0 })
            }
            // Leaf decorators (rules, line breaks) are addressed through their parent.
            _ => match (self.parent(key), self.index_in_parent(key)) {
                (Some(parent), Some(index)) => {
                    Point::new(parent, if at_end { index + 1 } else { index })
                }
                _ => Point::new(key, 0),
            },
        }
    }
}
