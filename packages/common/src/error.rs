use thiserror::Error;

/// Common error type shared by the coursekit crates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommonError {
    #[error("Invalid id strategy: {0}")]
    InvalidIdStrategy(String),
}
