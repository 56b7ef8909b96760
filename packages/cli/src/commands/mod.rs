pub mod blocks;
pub mod check;
pub mod init;
pub mod normalize;
pub mod toc;

pub use blocks::{blocks, BlocksArgs};
pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use normalize::{normalize, NormalizeArgs};
pub use toc::{toc, TocArgs};
