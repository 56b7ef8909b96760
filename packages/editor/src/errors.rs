//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Tree error: {0}")]
    Tree(#[from] coursekit_schema::TreeError),

    #[error("Codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] coursekit_common::CommonError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}
