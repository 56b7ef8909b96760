//! # Coursekit TOC
//!
//! Table of contents for a course: a single titled root holding chapters,
//! chapters holding lessons. Each item carries its lesson as a serialized
//! document produced by `coursekit-editor`.
//!
//! ```rust,ignore
//! use coursekit_toc::{TocAction, TocEditor, ROOT_ID};
//!
//! let mut toc = TocEditor::new(IdGenerator::random());
//! toc.dispatch(TocAction::AddChild { parent_id: ROOT_ID.into() });
//! println!("{}", toc.state().to_json_pretty()?);
//! ```

mod action;
mod editor;
mod error;
mod item;
mod state;

pub use action::{ActionOutcome, Position, TocAction};
pub use editor::TocEditor;
pub use error::{TocError, TocResult};
pub use item::{ItemType, TocItem, ROOT_ID};
pub use state::{ContextMenu, OutlineEntry, TocState};
