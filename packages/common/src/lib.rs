pub mod clock;
pub mod error;
pub mod id_generator;

pub use clock::*;
pub use error::*;
pub use id_generator::*;
