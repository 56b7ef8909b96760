use crate::tree::NodeKey;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node {0} has no parent")]
    Detached(NodeKey),

    #[error("Node {0} cannot hold children")]
    NotAnElement(NodeKey),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The root node cannot be moved or removed")]
    RootImmutable,
}
