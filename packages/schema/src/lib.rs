//! # Coursekit Schema
//!
//! The lesson document model: the closed catalogue of node kinds, the
//! arena-backed content tree with its editing primitives, selections, and a
//! read-only checker for the composite shape rules.
//!
//! Nothing here knows about commands or serialization; those live in
//! `coursekit-editor`.

pub mod block_id;
pub mod error;
pub mod node;
pub mod selection;
pub mod shape;
pub mod tree;
pub mod visitor;

pub use block_id::BlockId;
pub use error::{TreeError, TreeResult};
pub use node::{
    BlockStyle, Direction, HeadingTag, ImageSource, LinkTarget, ListType, NodeData, NodeKind,
    TextMode, TextRun, MAX_OPTIONS, MIN_OPTIONS,
};
pub use selection::{Point, Selection};
pub use shape::{violations, ShapeViolation};
pub use tree::{ContentTree, Node, NodeKey};
pub use visitor::{walk_node, Visitor};
