//! Priority-ordered command dispatch.
//!
//! Handlers are tried from the highest priority down, in registration order
//! within a priority. The first one to report [`CommandOutcome::Handled`]
//! stops the chain; a handler that returns `NotHandled` must not have
//! touched the tree.

use crate::commands::{Command, CommandOutcome, Priority};
use crate::document::Transaction;
use coursekit_common::Clock;
use tracing::trace;

/// One participant in command dispatch
pub trait CommandHandler: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn handle(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        clock: &dyn Clock,
    ) -> CommandOutcome;
}

#[derive(Debug, Default)]
pub struct HandlerChain {
    handlers: Vec<(Priority, Box<dyn CommandHandler>)>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler after every handler of equal or higher priority
    pub fn register(&mut self, priority: Priority, handler: Box<dyn CommandHandler>) {
        let index = self
            .handlers
            .iter()
            .position(|(p, _)| *p < priority)
            .unwrap_or(self.handlers.len());
        self.handlers.insert(index, (priority, handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in dispatch order
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|(_, h)| h.name()).collect()
    }

    pub fn dispatch(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        clock: &dyn Clock,
    ) -> CommandOutcome {
        for (priority, handler) in self.handlers.iter_mut() {
            if handler.handle(command, tx, clock).is_handled() {
                trace!(command = command.name(), handler = handler.name(), ?priority, "Command handled");
                return CommandOutcome::Handled;
            }
        }
        CommandOutcome::NotHandled
    }
}
