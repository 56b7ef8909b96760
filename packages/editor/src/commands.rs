//! # Editor Commands
//!
//! Keyboard gestures and block-level operations, as delivered by the host
//! editing engine. A command carries only what the gesture itself knows;
//! everything else (caret, surrounding blocks) is read from the document when
//! a handler runs.

use coursekit_schema::NodeKey;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert a fresh multiple-choice question near the selection
    InsertMcq,

    /// Append an empty option to the question holding the selection
    AddMcqOption,

    /// Remove an option, keeping at least the minimum count
    RemoveMcqOption { option: NodeKey },

    /// Mark an option as a correct answer (or not)
    SetMcqOptionChecked { option: NodeKey, checked: bool },

    /// Insert an open collapsible section near the selection
    InsertCollapsible,

    /// Flip a collapsible section between open and closed
    ToggleCollapsible { container: NodeKey },

    /// Enter, with or without the Ctrl/Cmd modifier
    KeyEnter { ctrl: bool },

    /// Backspace (delete backward)
    KeyBackspace,

    /// Arrow key
    KeyArrow(Arrow),

    /// Typed text at the caret
    InsertText(String),
}

impl Command {
    /// Debug name, also used as the undo entry description
    pub fn name(&self) -> &'static str {
        match self {
            Command::InsertMcq => "insert-mcq",
            Command::AddMcqOption => "add-mcq-option",
            Command::RemoveMcqOption { .. } => "remove-mcq-option",
            Command::SetMcqOptionChecked { .. } => "set-mcq-option-checked",
            Command::InsertCollapsible => "insert-collapsible",
            Command::ToggleCollapsible { .. } => "toggle-collapsible",
            Command::KeyEnter { ctrl: true } => "key-ctrl-enter",
            Command::KeyEnter { ctrl: false } => "key-enter",
            Command::KeyBackspace => "key-backspace",
            Command::KeyArrow(_) => "key-arrow",
            Command::InsertText(_) => "insert-text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

impl Arrow {
    /// Up and Left move the caret towards the start of the document
    pub fn is_backward(self) -> bool {
        matches!(self, Arrow::Up | Arrow::Left)
    }
}

/// Whether a handler consumed a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Handled,
    NotHandled,
}

impl CommandOutcome {
    pub fn is_handled(self) -> bool {
        self == CommandOutcome::Handled
    }
}

/// Dispatch priority; higher runs first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Built-in fallback editing
    Editor,
    Low,
    Normal,
    High,
    Critical,
}
