//! Minimal plain-text editing at the lowest priority.
//!
//! Stands in for the host engine's own editing so a session can be driven
//! end to end: typing into text runs, splitting a block on Enter and deleting
//! backward inside a run or an empty block. Range selections are left to the
//! host.

use crate::commands::{Command, CommandOutcome};
use crate::document::Transaction;
use crate::handler::CommandHandler;
use coursekit_common::Clock;
use coursekit_schema::{NodeData, NodeKey, NodeKind, Point, Selection, TreeResult};
use tracing::warn;

#[derive(Debug, Default)]
pub struct TextEditing;

/// Byte index of the `chars`-th character of `text`
fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Nearest block that holds inline content
fn text_block(tx: &Transaction<'_>, key: NodeKey) -> Option<NodeKey> {
    let tree = tx.tree();
    std::iter::once(key).chain(tree.ancestors(key)).find(|k| {
        matches!(
            tree.kind(*k),
            Some(
                NodeKind::Paragraph
                    | NodeKind::Heading
                    | NodeKind::Quote
                    | NodeKind::Code
                    | NodeKind::ListItem
            )
        )
    })
}

impl TextEditing {
    pub fn new() -> Self {
        Self
    }

    fn insert_text(tx: &mut Transaction<'_>, text: &str) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        if text.is_empty() {
            return Ok(CommandOutcome::Handled);
        }
        let inserted = text.chars().count();

        if tx.tree().is_kind(caret.key, NodeKind::Text) {
            if let Some(NodeData::Text(run)) = tx.tree_mut().data_mut(caret.key) {
                let at = byte_index(&run.text, caret.offset);
                run.text.insert_str(at, text);
            }
            tx.set_selection(Some(Selection::caret(Point::new(
                caret.key,
                caret.offset + inserted,
            ))));
            return Ok(CommandOutcome::Handled);
        }

        if text_block(tx, caret.key) != Some(caret.key) {
            return Ok(CommandOutcome::NotHandled);
        }
        let run = tx.tree_mut().create(NodeData::text(text));
        tx.tree_mut().insert_at(caret.key, caret.offset, run)?;
        tx.set_selection(Some(Selection::caret(Point::new(run, inserted))));
        Ok(CommandOutcome::Handled)
    }

    /// Split the block at the caret; the tail moves into a new paragraph
    fn split_block(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(block) = text_block(tx, caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let paragraph = tx.create_paragraph();
        tx.tree_mut().insert_after(block, paragraph)?;

        let tree = tx.tree();
        let (tail_start, split_run) = match tree.data(caret.key) {
            Some(NodeData::Text(_)) if tree.parent(caret.key) == Some(block) => {
                let index = tree.index_in_parent(caret.key).unwrap_or(0);
                (index + 1, Some(caret.key))
            }
            _ if caret.key == block => (caret.offset, None),
            _ => (tree.child_count(block), None),
        };

        if let Some(run_key) = split_run {
            let tail = match tx.tree_mut().data_mut(run_key) {
                Some(NodeData::Text(run)) => {
                    let at = byte_index(&run.text, caret.offset);
                    let mut tail = run.clone();
                    tail.text = run.text.split_off(at);
                    Some(tail)
                }
                _ => None,
            };
            if let Some(tail) = tail.filter(|t| !t.is_empty()) {
                let tail_key = tx.tree_mut().create(NodeData::Text(tail));
                tx.tree_mut().append(paragraph, tail_key)?;
            }
        }

        let children = tx.tree().children(block);
        let moved: Vec<NodeKey> = children[tail_start.min(children.len())..].to_vec();
        for child in moved {
            tx.tree_mut().append(paragraph, child)?;
        }
        tx.select_start(paragraph);
        Ok(CommandOutcome::Handled)
    }

    fn delete_backward(tx: &mut Transaction<'_>) -> TreeResult<CommandOutcome> {
        let Some(caret) = tx.caret() else {
            return Ok(CommandOutcome::NotHandled);
        };

        if caret.offset > 0 {
            if tx.tree().is_kind(caret.key, NodeKind::Text) {
                if let Some(NodeData::Text(run)) = tx.tree_mut().data_mut(caret.key) {
                    let at = byte_index(&run.text, caret.offset - 1);
                    run.text.remove(at);
                }
                tx.set_selection(Some(Selection::caret(Point::new(
                    caret.key,
                    caret.offset - 1,
                ))));
                return Ok(CommandOutcome::Handled);
            }
            return Ok(CommandOutcome::NotHandled);
        }

        // An empty block merges into its previous sibling; a first block stays.
        let tree = tx.tree();
        let Some(block) = text_block(tx, caret.key) else {
            return Ok(CommandOutcome::NotHandled);
        };
        let Some(previous) = tree.prev_sibling(block) else {
            return Ok(CommandOutcome::NotHandled);
        };
        if !tree.text_content(block).is_empty() || !tx.caret_at_start_of(block) {
            return Ok(CommandOutcome::NotHandled);
        }
        tx.tree_mut().remove(block)?;
        tx.select_end(previous);
        Ok(CommandOutcome::Handled)
    }
}

impl CommandHandler for TextEditing {
    fn name(&self) -> &'static str {
        "text-editing"
    }

    fn handle(
        &mut self,
        command: &Command,
        tx: &mut Transaction<'_>,
        _clock: &dyn Clock,
    ) -> CommandOutcome {
        let result = match command {
            Command::InsertText(text) => Self::insert_text(tx, text),
            Command::KeyEnter { ctrl: false } => Self::split_block(tx),
            Command::KeyBackspace => Self::delete_backward(tx),
            _ => Ok(CommandOutcome::NotHandled),
        };
        result.unwrap_or_else(|e| {
            warn!(command = command.name(), error = %e, "Text edit failed");
            CommandOutcome::NotHandled
        })
    }
}
