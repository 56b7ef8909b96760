//! # Coursekit Editor
//!
//! Editing engine for interactive lesson documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: node kinds + content tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + commands       │
//! │  - Load/save through the JSON codec         │
//! │  - Update transactions with normalization   │
//! │  - Handler chain for MCQ and collapsibles   │
//! │  - Snapshot undo history                    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Shape is enforced, not assumed**: every update ends with the
//!    normalizer repairing composite blocks to their fixed layout
//! 2. **Block ids outlive edits**: ids survive serialization, undo and
//!    clipboard copies; node keys never leave the process
//! 3. **First handler wins**: commands run through a priority-ordered chain
//!    and fall through to plain text editing when nobody claims them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coursekit_editor::{Command, Document, EditSession, EditorConfig};
//!
//! let config = EditorConfig::default();
//! let doc = Document::load(Path::new("lesson.json"), &config)?;
//! let mut session = EditSession::new("client-1", doc, &config);
//!
//! session.dispatch(Command::InsertMcq);
//! session.dispatch(Command::InsertText("Which planet is largest?".into()));
//!
//! session.document.save(Path::new("lesson.json"), true)?;
//! ```

pub mod codec;
mod collapsible;
mod commands;
mod config;
mod document;
mod errors;
mod handler;
mod identity;
mod mcq;
mod normalize;
mod session;
mod text_editing;
mod undo_stack;

pub use codec::{
    empty_document_json, export_json, export_json_pretty, import_document, CodecError,
    SerializedDocument, SerializedNode, CODEC_VERSION, EMPTY_DOCUMENT_JSON,
};
pub use collapsible::CollapsibleController;
pub use commands::{Arrow, Command, CommandOutcome, Priority};
pub use config::EditorConfig;
pub use document::{Document, DocumentSnapshot, Transaction};
pub use errors::EditorError;
pub use handler::{CommandHandler, HandlerChain};
pub use identity::{block_index, BlockIdentity};
pub use mcq::{McqController, EXPLANATION_PLACEHOLDER, OPTION_PLACEHOLDER, QUESTION_PLACEHOLDER};
pub use normalize::{NodeTransform, NormalizeReport, Normalizer};
pub use session::EditSession;
pub use text_editing::TextEditing;
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export schema types for convenience
pub use coursekit_schema::{
    violations, BlockId, ContentTree, NodeData, NodeKey, NodeKind, Point, Selection,
    ShapeViolation,
};
