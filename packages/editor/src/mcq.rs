//! # MCQ Controller
//!
//! Keyboard and block commands for multiple-choice questions:
//!
//! ```text
//! McqContainer
//! ├── McqQuestion      "?..."
//! ├── McqOptions       2..=4 options
//! │   ├── McqOption    "option..."
//! │   └── McqOption    ""
//! └── McqExplanation   "explanation..."
//! ```
//!
//! The shape itself is guarded by the normalizer. The only state kept here is
//! the first press of the double-backspace gesture that deletes a question.

use crate::commands::{Command, CommandOutcome};
use crate::document::Transaction;
use crate::handler::CommandHandler;
use coursekit_common::Clock;
use coursekit_schema::{BlockId, NodeData, NodeKey, NodeKind, TreeResult, MAX_OPTIONS, MIN_OPTIONS};
use tracing::{debug, warn};

pub const QUESTION_PLACEHOLDER: &str = "?...";
pub const OPTION_PLACEHOLDER: &str = "option...";
pub const EXPLANATION_PLACEHOLDER: &str = "explanation...";

#[derive(Debug)]
pub struct McqController {
    window_ms: u64,
    /// Container and time of the first backspace at the start of a question
    last_backspace: Option<(BlockId, u64)>,
}

impl McqController {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_backspace: None,
        }
    }

    fn insert(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let question_text = tx.create_paragraph_with_text(QUESTION_PLACEHOLDER)?;
        let question = tx.create(NodeData::McqQuestion);
        tx.tree_mut().append(question, question_text)?;

        let options = tx.create(NodeData::McqOptions);
        for label in [OPTION_PLACEHOLDER, ""] {
            let text = tx.create_paragraph_with_text(label)?;
            let option = tx.create(NodeData::McqOption { checked: false });
            tx.tree_mut().append(option, text)?;
            tx.tree_mut().append(options, option)?;
        }

        let explanation_text = tx.create_paragraph_with_text(EXPLANATION_PLACEHOLDER)?;
        let explanation = tx.create(NodeData::McqExplanation);
        tx.tree_mut().append(explanation, explanation_text)?;

        let container = tx.create(NodeData::McqContainer);
        for part in [question, options, explanation] {
            tx.tree_mut().append(container, part)?;
        }
        tx.insert_block_near_selection(container)?;
        tx.select_end(question_text);
        Ok(CommandOutcome::Handled)
    }

    fn new_option(tx: &mut Transaction<'_>) -> TreeResult<NodeKey> {
        let text = tx.create_paragraph();
        let option = tx.create(NodeData::McqOption { checked: false });
        tx.tree_mut().append(option, text)?;
        Ok(option)
    }

    /// Options container of the question holding the selection
    fn options_at_selection(tx: &Transaction<'_>) -> Option<NodeKey> {
        let tree = tx.tree();
        let anchor = tx.anchor()?;
        let container = tree.find_ancestor(anchor.key, NodeKind::McqContainer)?;
        tree.children(container)
            .iter()
            .copied()
            .find(|c| tree.is_kind(*c, NodeKind::McqOptions))
    }

    fn add_option(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(options) = Self::options_at_selection(tx) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if tx.tree().child_count(options) >= MAX_OPTIONS {
            return Ok(CommandOutcome::NotHandled);
        }
        let option = Self::new_option(tx)?;
        tx.tree_mut().append(options, option)?;
        tx.select_end(option);
        Ok(CommandOutcome::Handled)
    }

    fn remove_option(tx: &mut Transaction<'_>, option: NodeKey) -> TreeResult<CommandOutcome> {
        let tree = tx.tree();
        if !tree.is_kind(option, NodeKind::McqOption) {
            return Ok(CommandOutcome::NotHandled);
        }
        let Some(options) = tree.parent(option) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if tree.child_count(options) <= MIN_OPTIONS {
            return Ok(CommandOutcome::NotHandled);
        }

        let holds_caret = tx
            .anchor()
            .map_or(false, |a| a.key == option || tree.is_ancestor_of(option, a.key));
        let neighbour = tree.prev_sibling(option).or_else(|| tree.next_sibling(option));

        tx.tree_mut().remove(option)?;
        if let (true, Some(neighbour)) = (holds_caret, neighbour) {
            tx.select_end(neighbour);
        }
        Ok(CommandOutcome::Handled)
    }

    fn set_checked(
        tx: &mut Transaction<'_>,
        option: NodeKey,
        checked: bool,
    ) -> TreeResult<CommandOutcome> {
        let current = match tx.tree().data(option) {
            Some(NodeData::McqOption { checked }) => *checked,
            _ => return Ok(CommandOutcome::NotHandled),
        };
        if current != checked {
            if let Some(NodeData::McqOption { checked: value }) = tx.tree_mut().data_mut(option) {
                *value = checked;
            }
        }
        Ok(CommandOutcome::Handled)
    }

    /// Ctrl+Enter: question → first option → ... → explanation → out
    fn navigate(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(anchor) = tx.anchor() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let tree = tx.tree();
        let mut chain = vec![anchor.key];
        chain.extend(tree.ancestors(anchor.key));
        let Some(section) = chain.into_iter().find(|k| {
            matches!(
                tree.kind(*k),
                Some(NodeKind::McqQuestion | NodeKind::McqOption | NodeKind::McqExplanation)
            )
        }) else {
            return Ok(CommandOutcome::NotHandled);
        };

        match tree.kind(section) {
            Some(NodeKind::McqQuestion) => {
                let first = tree
                    .next_sibling(section)
                    .filter(|o| tree.is_kind(*o, NodeKind::McqOptions))
                    .and_then(|o| tree.first_child(o));
                match first {
                    Some(first) => {
                        tx.select_end(first);
                        Ok(CommandOutcome::Handled)
                    }
                    None => Ok(CommandOutcome::NotHandled),
                }
            }
            Some(NodeKind::McqOption) => {
                let Some(options) = tree.parent(section) else {
                    return Ok(CommandOutcome::NotHandled);
                };
                if let Some(next) = tree.next_sibling(section) {
                    tx.select_end(next);
                    return Ok(CommandOutcome::Handled);
                }
                if tree.child_count(options) < MAX_OPTIONS {
                    let option = Self::new_option(tx)?;
                    tx.tree_mut().append(options, option)?;
                    tx.select_end(option);
                    return Ok(CommandOutcome::Handled);
                }
                match tree
                    .next_sibling(options)
                    .filter(|e| tree.is_kind(*e, NodeKind::McqExplanation))
                {
                    Some(explanation) => {
                        tx.select_end(explanation);
                        Ok(CommandOutcome::Handled)
                    }
                    None => Ok(CommandOutcome::NotHandled),
                }
            }
            _ => {
                let Some(container) = tree
                    .parent(section)
                    .filter(|c| tree.is_kind(*c, NodeKind::McqContainer))
                else {
                    return Ok(CommandOutcome::NotHandled);
                };
                let paragraph = tx.create_paragraph();
                tx.tree_mut().insert_after(container, paragraph)?;
                tx.select_start(paragraph);
                Ok(CommandOutcome::Handled)
            }
        }
    }

    /// Backspace at the first content node of a question: the first press is
    /// swallowed, a second one within the window replaces the whole question
    /// with an empty paragraph
    fn collapse_on_double_backspace(
        &mut self,
        tx: &mut Transaction<'_>,
        clock: &dyn Clock,
    ) -> TreeResult<CommandOutcome> {
        let tree = tx.tree();
        let Some(caret) = tx.caret().filter(|c| c.offset == 0) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(question) = tree.find_ancestor(caret.key, NodeKind::McqQuestion) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if tree.first_descendant(question) != Some(caret.key) {
            return Ok(CommandOutcome::NotHandled);
        }
        let Some(container) = tree
            .parent(question)
            .filter(|c| tree.is_kind(*c, NodeKind::McqContainer))
        else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(container_id) = tree.block_id(container).cloned() else {
            return Ok(CommandOutcome::NotHandled);
        };

        let now = clock.now_millis();
        let repeat = matches!(
            &self.last_backspace,
            Some((id, at)) if *id == container_id && now.saturating_sub(*at) <= self.window_ms
        );
        if !repeat {
            debug!(container = %container_id, "First backspace at question start, waiting for second");
            self.last_backspace = Some((container_id, now));
            return Ok(CommandOutcome::Handled);
        }

        self.last_backspace = None;
        let paragraph = tx.create_paragraph();
        tx.tree_mut().replace(container, paragraph)?;
        tx.select_start(paragraph);
        debug!(container = %container_id, "Question removed by double backspace");
        Ok(CommandOutcome::Handled)
    }

    /// Backspace at the start of an empty option that is not the first one
    fn backspace_in_empty_option(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let tree = tx.tree();
        let Some(caret) = tx.caret().filter(|c| c.offset == 0) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(option) = tree.find_ancestor(caret.key, NodeKind::McqOption) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if !tree.text_content(option).trim().is_empty() {
            return Ok(CommandOutcome::NotHandled);
        }
        let Some(options) = tree.parent(option) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if tree.child_count(options) <= MIN_OPTIONS {
            return Ok(CommandOutcome::NotHandled);
        }
        let Some(previous) = tree.prev_sibling(option) else {
            return Ok(CommandOutcome::NotHandled);
        };

        tx.tree_mut().remove(option)?;
        tx.select_end(previous);
        Ok(CommandOutcome::Handled)
    }

    fn dispatch(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        clock: &dyn Clock,
    ) -> TreeResult<CommandOutcome> {
        match command {
            Command::InsertMcq => Self::insert(tx),
            Command::AddMcqOption => Self::add_option(tx),
            Command::RemoveMcqOption { option } => Self::remove_option(tx, *option),
            Command::SetMcqOptionChecked { option, checked } => {
                Self::set_checked(tx, *option, *checked)
            }
            Command::KeyEnter { ctrl: true } => Self::navigate(tx),
            Command::KeyBackspace => {
                let outcome = self.collapse_on_double_backspace(tx, clock)?;
                if outcome.is_handled() {
                    return Ok(outcome);
                }
                Self::backspace_in_empty_option(tx)
            }
            _ => Ok(CommandOutcome::NotHandled),
        }
    }
}

impl Default for McqController {
    fn default() -> Self {
        Self::new(500)
    }
}

impl CommandHandler for McqController {
    fn name(&self) -> &'static str {
        "mcq"
    }

    fn handle(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        clock: &dyn Clock,
    ) -> CommandOutcome {
        self.dispatch(command, tx, clock).unwrap_or_else(|e| {
            warn!(command = command.name(), error = %e, "MCQ command failed");
            CommandOutcome::NotHandled
        })
    }
}
