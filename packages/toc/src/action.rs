//! # TOC Actions
//!
//! Every change to the table of contents goes through one of these. They
//! serialize as `{ "type": "ADD_CHILD", "payload": { "parentID": ".." } }`.
//!
//! ## Semantics
//!
//! ### Add
//! - `AddChild` appends under the parent; a title's children are chapters,
//!   everything else gets lessons
//! - Siblings copy the type of the item they are placed next to
//! - The new item becomes selected and enters rename mode
//!
//! ### Delete
//! - Removes the item and all of its descendants
//! - The root can never be deleted
//! - A selection that no longer resolves falls back to the deleted item's parent
//!
//! ### Rename
//! - A blank name is dropped; rename mode ends either way

use serde::{Deserialize, Serialize};

/// Screen position a context menu opens at
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TocAction {
    AddChild {
        #[serde(rename = "parentID")]
        parent_id: String,
    },
    AddSiblingBefore {
        #[serde(rename = "siblingID")]
        sibling_id: String,
    },
    AddSiblingAfter {
        #[serde(rename = "siblingID")]
        sibling_id: String,
    },
    Delete {
        #[serde(rename = "itemID")]
        item_id: String,
    },
    Rename {
        #[serde(rename = "itemID")]
        item_id: String,
        #[serde(rename = "newName")]
        new_name: String,
    },
    Select {
        #[serde(rename = "itemID")]
        item_id: String,
    },
    OpenContextMenu {
        position: Position,
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    CloseContextMenu,
    StartRenaming {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    StopRenaming,
    UpdateContent {
        #[serde(rename = "itemID")]
        item_id: String,
        content: String,
    },
}

impl TocAction {
    pub fn name(&self) -> &'static str {
        match self {
            TocAction::AddChild { .. } => "ADD_CHILD",
            TocAction::AddSiblingBefore { .. } => "ADD_SIBLING_BEFORE",
            TocAction::AddSiblingAfter { .. } => "ADD_SIBLING_AFTER",
            TocAction::Delete { .. } => "DELETE",
            TocAction::Rename { .. } => "RENAME",
            TocAction::Select { .. } => "SELECT",
            TocAction::OpenContextMenu { .. } => "OPEN_CONTEXT_MENU",
            TocAction::CloseContextMenu => "CLOSE_CONTEXT_MENU",
            TocAction::StartRenaming { .. } => "START_RENAMING",
            TocAction::StopRenaming => "STOP_RENAMING",
            TocAction::UpdateContent { .. } => "UPDATE_CONTENT",
        }
    }
}

/// Whether an action changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Precondition failed (root delete, unknown id); state untouched
    Ignored,
}

impl ActionOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_wire_format() {
        let action = TocAction::AddSiblingAfter {
            sibling_id: "a".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({ "type": "ADD_SIBLING_AFTER", "payload": { "siblingID": "a" } })
        );

        let parsed: TocAction = serde_json::from_value(json!({
            "type": "RENAME",
            "payload": { "itemID": "x", "newName": "Intro" }
        }))
        .unwrap();
        assert_eq!(
            parsed,
            TocAction::Rename {
                item_id: "x".to_string(),
                new_name: "Intro".to_string()
            }
        );
    }

    #[test]
    fn test_unit_actions_need_no_payload() {
        let parsed: TocAction =
            serde_json::from_value(json!({ "type": "CLOSE_CONTEXT_MENU" })).unwrap();
        assert_eq!(parsed, TocAction::CloseContextMenu);
        assert_eq!(parsed.name(), "CLOSE_CONTEXT_MENU");
    }
}
