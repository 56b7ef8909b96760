//! # Collapsible Controller
//!
//! Commands for collapsible sections, a `[Title, Content]` pair under a
//! container that is either open or closed. Closed content stays in the tree
//! untouched; only the `open` flag changes.
//!
//! Caret escapes:
//! - Enter in the title goes into the content when open, or to a new
//!   paragraph after the section when closed
//! - Backspace at the start of the title pulls the title out in front of the
//!   container, which the normalizer then turns into a paragraph
//! - Arrows at the outer edge of a section that starts or ends its parent
//!   create a paragraph to land on

use crate::commands::{Arrow, Command, CommandOutcome};
use crate::document::Transaction;
use crate::handler::CommandHandler;
use coursekit_common::Clock;
use coursekit_schema::{NodeData, NodeKey, NodeKind, TreeResult};
use tracing::warn;

#[derive(Debug, Default)]
pub struct CollapsibleController;

/// Container, title and content of the section holding `key`
fn section_of(tx: &Transaction<'_>, key: NodeKey) -> Option<(NodeKey, NodeKey, NodeKey)> {
    let tree = tx.tree();
    let container = tree.find_ancestor(key, NodeKind::CollapsibleContainer)?;
    let title = tree
        .first_child(container)
        .filter(|t| tree.is_kind(*t, NodeKind::CollapsibleTitle))?;
    let content = tree
        .last_child(container)
        .filter(|c| tree.is_kind(*c, NodeKind::CollapsibleContent))?;
    Some((container, title, content))
}

fn is_open(tx: &Transaction<'_>, container: NodeKey) -> bool {
    matches!(
        tx.tree().data(container),
        Some(NodeData::CollapsibleContainer { open: true })
    )
}

impl CollapsibleController {
    pub fn new() -> Self {
        Self
    }

    fn insert(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let title_text = tx.create_paragraph();
        let title = tx.create(NodeData::CollapsibleTitle);
        tx.tree_mut().append(title, title_text)?;

        let body = tx.create_paragraph();
        let content = tx.create(NodeData::CollapsibleContent);
        tx.tree_mut().append(content, body)?;

        let container = tx.create(NodeData::CollapsibleContainer { open: true });
        tx.tree_mut().append(container, title)?;
        tx.tree_mut().append(container, content)?;
        tx.insert_block_near_selection(container)?;
        tx.select_start(title_text);
        Ok(CommandOutcome::Handled)
    }

    fn toggle(tx: &mut Transaction<'_>, container: NodeKey) -> TreeResult<CommandOutcome> {
        let open = match tx.tree().data(container) {
            Some(NodeData::CollapsibleContainer { open }) => *open,
            _ => return Ok(CommandOutcome::NotHandled),
        };
        if let Some(NodeData::CollapsibleContainer { open: value }) =
            tx.tree_mut().data_mut(container)
        {
            *value = !open;
        }

        // A caret left inside hidden content moves up to the title.
        if open {
            let section = section_of(tx, container);
            let hidden = tx.anchor().zip(section).filter(|(anchor, (_, _, content))| {
                tx.tree().is_ancestor_of(*content, anchor.key)
            });
            if let Some((_, (_, title, _))) = hidden {
                tx.select_end(title);
            }
        }
        Ok(CommandOutcome::Handled)
    }

    fn enter_in_title(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(anchor) = tx.anchor() else {
            return Ok(CommandOutcome::NotHandled);
        };
        if tx
            .tree()
            .find_ancestor(anchor.key, NodeKind::CollapsibleTitle)
            .is_none()
        {
            return Ok(CommandOutcome::NotHandled);
        }
        let Some((container, title, content)) = section_of(tx, anchor.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        // The title found must be this section's own title, not a nested one's.
        if !(anchor.key == title || tx.tree().is_ancestor_of(title, anchor.key)) {
            return Ok(CommandOutcome::NotHandled);
        }

        if is_open(tx, container) {
            let target = match tx.tree().first_child(content) {
                Some(first) if !tx.tree().is_kind(first, NodeKind::Text) => first,
                _ => {
                    let paragraph = tx.create_paragraph();
                    tx.tree_mut().append(content, paragraph)?;
                    paragraph
                }
            };
            tx.select_start(target);
        } else {
            let paragraph = tx.create_paragraph();
            tx.tree_mut().insert_after(container, paragraph)?;
            tx.select_start(paragraph);
        }
        Ok(CommandOutcome::Handled)
    }

    /// Backspace at the very start of a title moves the title out in front of
    /// its container
    fn escape_title(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some((container, title, _)) = section_of(tx, caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if !tx.caret_at_start_of(title) {
            return Ok(CommandOutcome::NotHandled);
        }
        tx.tree_mut().insert_before(container, title)?;
        Ok(CommandOutcome::Handled)
    }

    /// Backspace at the start of a block that follows a closed section opens
    /// the section rather than deleting into hidden content
    fn open_section_before(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let tree = tx.tree();
        let Some(top) = tree.top_level(caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(previous) = tree.prev_sibling(top) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if !tx.caret_at_start_of(top)
            || tree.data(previous) != Some(&NodeData::CollapsibleContainer { open: false })
        {
            return Ok(CommandOutcome::NotHandled);
        }
        if let Some(NodeData::CollapsibleContainer { open }) = tx.tree_mut().data_mut(previous) {
            *open = true;
        }
        Ok(CommandOutcome::Handled)
    }

    /// Up/Left at the very start of a section that opens its parent
    fn escape_before(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some((container, _, _)) = section_of(tx, caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let tree = tx.tree();
        let is_first = tree
            .parent(container)
            .and_then(|p| tree.first_child(p))
            == Some(container);
        if !is_first || !tx.caret_at_start_of(container) {
            return Ok(CommandOutcome::NotHandled);
        }
        let paragraph = tx.create_paragraph();
        tx.tree_mut().insert_before(container, paragraph)?;
        // Nothing moves the caret after a handled arrow, so move it here.
        tx.select_start(paragraph);
        Ok(CommandOutcome::Handled)
    }

    /// Down/Right at the very end of a section that closes its parent; the end
    /// of the title counts when the section is closed
    fn escape_after(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some((container, title, content)) = section_of(tx, caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let tree = tx.tree();
        let is_last = tree
            .parent(container)
            .and_then(|p| tree.last_child(p))
            == Some(container);
        let at_end = if is_open(tx, container) {
            tx.caret_at_end_of(content)
        } else {
            tx.caret_at_end_of(title)
        };
        if !is_last || !at_end {
            return Ok(CommandOutcome::NotHandled);
        }
        let paragraph = tx.create_paragraph();
        tx.tree_mut().insert_after(container, paragraph)?;
        tx.select_start(paragraph);
        Ok(CommandOutcome::Handled)
    }

    fn dispatch(&mut self, command: &Command, tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        match command {
            Command::InsertCollapsible => Self::insert(tx),
            Command::ToggleCollapsible { container } => Self::toggle(tx, *container),
            Command::KeyEnter { ctrl: false } => Self::enter_in_title(tx),
            Command::KeyBackspace => {
                let outcome = Self::escape_title(tx)?;
                if outcome.is_handled() {
                    return Ok(outcome);
                }
                Self::open_section_before(tx)
            }
            Command::KeyArrow(arrow) if arrow.is_backward() => Self::escape_before(tx),
            Command::KeyArrow(_) => Self::escape_after(tx),
            _ => Ok(CommandOutcome::NotHandled),
        }
    }
}

impl CommandHandler for CollapsibleController {
    fn name(&self) -> &'static str {
        "collapsible"
    }

    fn handle(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        _clock: &dyn Clock,
    ) -> CommandOutcome {
        self.dispatch(command, tx).unwrap_or_else(|e| {
            warn!(command = command.name(), error = %e, "Collapsible command failed");
            CommandOutcome::NotHandled
        })
    }
}
