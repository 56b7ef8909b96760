//! # Edit Session Management
//!
//! An `EditSession` is one user's editing context over a document: the
//! command handler chain, the clock gestures are timed against, and the undo
//! history.

use crate::collapsible::CollapsibleController;
use crate::commands::{Command, CommandOutcome, Priority};
use crate::config::EditorConfig;
use crate::handler::{CommandHandler, HandlerChain};
use crate::mcq::McqController;
use crate::text_editing::TextEditing;
use crate::undo_stack::UndoStack;
use crate::Document;
use coursekit_common::{Clock, SystemClock};
use tracing::debug;

/// Single edit session
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    pub document: Document,

    handlers: HandlerChain,
    clock: Box<dyn Clock>,
    undo_stack: UndoStack,
}

impl EditSession {
    /// Create new edit session timed by the system clock
    pub fn new(id: impl Into<String>, document: Document, config: &EditorConfig) -> Self {
        Self::with_clock(id, document, config, Box::new(SystemClock))
    }

    /// Create a session with the built-in handlers and an explicit clock
    pub fn with_clock(
        id: impl Into<String>,
        document: Document,
        config: &EditorConfig,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut handlers = HandlerChain::new();
        handlers.register(
            Priority::Low,
            Box::new(McqController::new(config.double_backspace_window_ms)),
        );
        handlers.register(Priority::Low, Box::new(CollapsibleController::new()));
        handlers.register(Priority::Editor, Box::new(TextEditing::new()));

        Self {
            id: id.into(),
            document,
            handlers,
            clock,
            undo_stack: UndoStack::with_max_levels(config.undo_levels),
        }
    }

    /// Add a handler to the chain
    pub fn register(&mut self, priority: Priority, handler: Box<dyn CommandHandler>) {
        self.handlers.register(priority, handler);
    }

    /// Run `command` through the handler chain as one update transaction.
    ///
    /// A command that changed the document is recorded for undo.
    pub fn dispatch(&mut self, command: Command) -> CommandOutcome {
        let before = self.document.snapshot();
        let version = self.document.version();

        let handlers = &mut self.handlers;
        let clock = self.clock.as_ref();
        let outcome = self
            .document
            .update(|tx| handlers.dispatch(&command, tx, clock));

        if self.document.version() != version {
            self.undo_stack.record(before, command.name());
        }
        debug!(
            session = %self.id,
            command = command.name(),
            ?outcome,
            version = self.document.version(),
            "Dispatched command"
        );
        outcome
    }

    /// Group the following commands into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.undo_stack.begin_batch(&self.document);
        self.undo_stack.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.undo_stack.end_batch(&self.document);
    }

    pub fn undo(&mut self) -> bool {
        self.undo_stack.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> bool {
        self.undo_stack.redo(&mut self.document)
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Handler names in dispatch order
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursekit_common::ManualClock;
    use coursekit_schema::{violations, NodeKind};

    fn session() -> (EditSession, ManualClock) {
        let config = EditorConfig::sequential("s");
        let clock = ManualClock::new(10_000);
        let session = EditSession::with_clock(
            "client-1",
            Document::new(&config),
            &config,
            Box::new(clock.clone()),
        );
        (session, clock)
    }

    #[test]
    fn test_session_creation() {
        let (session, _) = session();
        assert_eq!(session.id, "client-1");
        assert_eq!(
            session.handler_names(),
            vec!["mcq", "collapsible", "text-editing"]
        );
        assert!(!session.undo_stack().can_undo());
    }

    #[test]
    fn test_dispatch_records_undo() {
        let (mut session, _) = session();
        assert!(session.dispatch(Command::InsertMcq).is_handled());
        assert_eq!(session.undo_stack().undo_description(), Some("insert-mcq"));

        assert!(session.undo());
        assert_eq!(session.document.blocks().len(), 1);
        assert!(session.redo());
        let mcq = session.document.blocks()[1];
        assert_eq!(session.document.tree().kind(mcq), Some(NodeKind::McqContainer));
        assert!(violations(session.document.tree()).is_empty());
    }

    #[test]
    fn test_swallowed_backspace_not_recorded() {
        let (mut session, _) = session();
        session.dispatch(Command::InsertMcq);
        let question = session.document.tree().children(session.document.blocks()[1])[0];
        session.document.select_start(question).unwrap();
        let levels = session.undo_stack().undo_levels();

        assert!(session.dispatch(Command::KeyBackspace).is_handled());
        assert_eq!(session.undo_stack().undo_levels(), levels);
    }

    #[test]
    fn test_double_backspace_through_chain() {
        let (mut session, clock) = session();
        session.dispatch(Command::InsertMcq);
        let mcq = session.document.blocks()[1];
        let question = session.document.tree().children(mcq)[0];
        session.document.select_start(question).unwrap();

        session.dispatch(Command::KeyBackspace);
        clock.advance(200);
        session.dispatch(Command::KeyBackspace);

        assert!(!session.document.tree().contains(mcq));
        let replacement = session.document.blocks()[1];
        assert_eq!(
            session.document.tree().kind(replacement),
            Some(NodeKind::Paragraph)
        );
        assert_eq!(session.document.tree().child_count(replacement), 0);
    }

    #[test]
    fn test_batch() {
        let (mut session, _) = session();
        session.begin_batch("two blocks");
        session.dispatch(Command::InsertMcq);
        session.dispatch(Command::InsertCollapsible);
        session.end_batch();

        assert_eq!(session.undo_stack().undo_levels(), 1);
        session.undo();
        assert_eq!(session.document.blocks().len(), 1);
    }
}
