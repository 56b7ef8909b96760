use thiserror::Error;

#[derive(Error, Debug)]
pub enum TocError {
    #[error("Malformed outline: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Outline has no root item")]
    MissingRoot,

    #[error("Root item must be a title without a parent")]
    InvalidRoot,

    #[error("Item {parent} lists unknown child {child}")]
    UnknownChild { parent: String, child: String },

    #[error("Item {child} is listed under {listed} but points at parent {parent}")]
    ParentMismatch {
        child: String,
        listed: String,
        parent: String,
    },

    #[error("Item {0} is not reachable from the root")]
    Unreachable(String),

    #[error("Item {0} is listed more than once")]
    Duplicate(String),

    #[error("Key {key} holds item {id}")]
    KeyMismatch { key: String, id: String },

    #[error("Cursor points at unknown item {0}")]
    DanglingCursor(String),
}

pub type TocResult<T> = Result<T, TocError>;
