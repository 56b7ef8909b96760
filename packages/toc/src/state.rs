//! TOC state and its reducer.
//!
//! The outline is a map of items keyed by id with one fixed root. Order lives
//! in each parent's `childIDs`; `parentID` points back up. `selectedId` always
//! resolves; `renamingId` and the context-menu target resolve when set.

use crate::action::{ActionOutcome, Position, TocAction};
use crate::error::{TocError, TocResult};
use crate::item::{ItemType, TocItem, ROOT_ID};
use coursekit_common::IdGenerator;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMenu {
    pub is_open: bool,
    pub position: Position,
    pub node_id: Option<String>,
}

/// One row of the depth-first outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub depth: usize,
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocState {
    pub toc_tree: BTreeMap<String, TocItem>,
    pub selected_id: String,
    #[serde(default)]
    pub context_menu: ContextMenu,
    #[serde(default)]
    pub renaming_id: Option<String>,
}

impl TocState {
    /// Starter outline: the course title with one chapter holding one lesson
    pub fn new(ids: &mut IdGenerator) -> Self {
        let chapter_id = ids.new_id();
        let lesson_id = ids.new_id();

        let mut root = TocItem::new(ROOT_ID, "Course Title", ItemType::Title, "");
        root.child_ids.push(chapter_id.clone());
        let mut chapter = TocItem::new(chapter_id.clone(), "Chapter 1", ItemType::Chapter, ROOT_ID);
        chapter.child_ids.push(lesson_id.clone());
        let lesson = TocItem::new(lesson_id.clone(), "Lesson 1", ItemType::Lesson, chapter_id.clone());

        let toc_tree = [root, chapter, lesson]
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();
        Self {
            toc_tree,
            selected_id: ROOT_ID.to_string(),
            context_menu: ContextMenu::default(),
            renaming_id: None,
        }
    }

    /// Outline holding only the course title
    pub fn with_root(name: impl Into<String>) -> Self {
        let root = TocItem::new(ROOT_ID, name, ItemType::Title, "");
        Self {
            toc_tree: BTreeMap::from([(ROOT_ID.to_string(), root)]),
            selected_id: ROOT_ID.to_string(),
            context_menu: ContextMenu::default(),
            renaming_id: None,
        }
    }

    pub fn root(&self) -> Option<&TocItem> {
        self.toc_tree.get(ROOT_ID)
    }

    pub fn get(&self, id: &str) -> Option<&TocItem> {
        self.toc_tree.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.toc_tree.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.toc_tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toc_tree.is_empty()
    }

    /// Children of `id` in order; empty for unknown ids
    pub fn children(&self, id: &str) -> Vec<&TocItem> {
        self.get(id)
            .map(|item| {
                item.child_ids
                    .iter()
                    .filter_map(|c| self.toc_tree.get(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of `id` and everything below it, parents first
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(item) = self.toc_tree.get(&current) {
                stack.extend(item.child_ids.iter().rev().cloned());
                out.push(current);
            }
        }
        out
    }

    /// Depth-first listing from the root
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut out = Vec::new();
        let mut stack = vec![(ROOT_ID.to_string(), 0)];
        let mut seen = HashSet::new();
        while let Some((id, depth)) = stack.pop() {
            let Some(item) = self.toc_tree.get(&id) else {
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            out.push(OutlineEntry {
                depth,
                id: item.id.clone(),
                name: item.name.clone(),
                item_type: item.item_type,
            });
            stack.extend(item.child_ids.iter().rev().map(|c| (c.clone(), depth + 1)));
        }
        out
    }

    pub fn to_json(&self) -> TocResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> TocResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a snapshot
    pub fn from_json(json: &str) -> TocResult<Self> {
        let state: TocState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Check the structural links of the outline
    pub fn validate(&self) -> TocResult<()> {
        let root = self.root().ok_or(TocError::MissingRoot)?;
        if root.item_type != ItemType::Title || !root.parent_id.is_empty() {
            return Err(TocError::InvalidRoot);
        }

        for (key, item) in &self.toc_tree {
            if *key != item.id {
                return Err(TocError::KeyMismatch {
                    key: key.clone(),
                    id: item.id.clone(),
                });
            }
            for child_id in &item.child_ids {
                let child = self
                    .toc_tree
                    .get(child_id)
                    .ok_or_else(|| TocError::UnknownChild {
                        parent: item.id.clone(),
                        child: child_id.clone(),
                    })?;
                if child.parent_id != item.id {
                    return Err(TocError::ParentMismatch {
                        child: child_id.clone(),
                        listed: item.id.clone(),
                        parent: child.parent_id.clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for id in self.subtree_ids(ROOT_ID) {
            if !seen.insert(id.clone()) {
                return Err(TocError::Duplicate(id));
            }
        }
        if let Some(orphan) = self.toc_tree.keys().find(|k| !seen.contains(*k)) {
            return Err(TocError::Unreachable(orphan.clone()));
        }

        let cursors = std::iter::once(&self.selected_id)
            .chain(self.renaming_id.as_ref())
            .chain(self.context_menu.node_id.as_ref());
        for cursor in cursors {
            if !self.contains(cursor) {
                return Err(TocError::DanglingCursor(cursor.clone()));
            }
        }
        Ok(())
    }

    /// Apply one action
    pub fn apply(&mut self, action: &TocAction, ids: &mut IdGenerator) -> ActionOutcome {
        let outcome = match action {
            TocAction::AddChild { parent_id } => self.add_child(parent_id, ids),
            TocAction::AddSiblingBefore { sibling_id } => self.add_sibling(sibling_id, 0, ids),
            TocAction::AddSiblingAfter { sibling_id } => self.add_sibling(sibling_id, 1, ids),
            TocAction::Delete { item_id } => self.delete(item_id),
            TocAction::Rename { item_id, new_name } => {
                if !new_name.trim().is_empty() {
                    if let Some(item) = self.toc_tree.get_mut(item_id) {
                        item.name = new_name.clone();
                    }
                }
                self.renaming_id = None;
                ActionOutcome::Applied
            }
            TocAction::Select { item_id } => {
                if !self.contains(item_id) {
                    return self.ignored(action);
                }
                self.selected_id = item_id.clone();
                ActionOutcome::Applied
            }
            TocAction::OpenContextMenu { position, node_id } => {
                if !self.contains(node_id) {
                    return self.ignored(action);
                }
                self.context_menu = ContextMenu {
                    is_open: true,
                    position: *position,
                    node_id: Some(node_id.clone()),
                };
                self.selected_id = node_id.clone();
                ActionOutcome::Applied
            }
            TocAction::CloseContextMenu => {
                self.context_menu = ContextMenu::default();
                ActionOutcome::Applied
            }
            TocAction::StartRenaming { node_id } => {
                if !self.contains(node_id) {
                    return self.ignored(action);
                }
                self.renaming_id = Some(node_id.clone());
                ActionOutcome::Applied
            }
            TocAction::StopRenaming => {
                self.renaming_id = None;
                ActionOutcome::Applied
            }
            TocAction::UpdateContent { item_id, content } => {
                let Some(item) = self.toc_tree.get_mut(item_id) else {
                    return self.ignored(action);
                };
                item.content = content.clone();
                ActionOutcome::Applied
            }
        };
        if outcome == ActionOutcome::Applied {
            debug!(action = action.name(), items = self.len(), "Applied TOC action");
        }
        outcome
    }

    fn ignored(&self, action: &TocAction) -> ActionOutcome {
        debug!(action = action.name(), "Ignored TOC action");
        ActionOutcome::Ignored
    }

    /// Next generator id not already naming an item
    fn fresh_id(&self, ids: &mut IdGenerator) -> String {
        loop {
            let id = ids.new_id();
            if id != ROOT_ID && !self.toc_tree.contains_key(&id) {
                return id;
            }
            debug!(id = %id, "Skipping id already in the outline");
        }
    }

    /// Insert a fresh item and put it in rename mode
    fn insert_new(&mut self, item: TocItem) {
        let id = item.id.clone();
        self.toc_tree.insert(id.clone(), item);
        self.selected_id = id.clone();
        self.renaming_id = Some(id);
    }

    fn add_child(&mut self, parent_id: &str, ids: &mut IdGenerator) -> ActionOutcome {
        let Some(item_type) = self.toc_tree.get(parent_id).map(|p| p.item_type.child_type()) else {
            debug!(parent = parent_id, "Unknown parent for new item");
            return ActionOutcome::Ignored;
        };
        let id = self.fresh_id(ids);
        if let Some(parent) = self.toc_tree.get_mut(parent_id) {
            parent.child_ids.push(id.clone());
        }

        self.insert_new(TocItem::new(id, item_type.default_name(), item_type, parent_id));
        ActionOutcome::Applied
    }

    /// New sibling at the sibling's index plus `offset`
    fn add_sibling(&mut self, sibling_id: &str, offset: usize, ids: &mut IdGenerator) -> ActionOutcome {
        let Some(sibling) = self.toc_tree.get(sibling_id) else {
            return ActionOutcome::Ignored;
        };
        let item_type = sibling.item_type;
        let parent_id = sibling.parent_id.clone();
        let Some(index) = self
            .toc_tree
            .get(&parent_id)
            .and_then(|p| p.child_ids.iter().position(|c| c == sibling_id))
        else {
            // The root has no siblings.
            return ActionOutcome::Ignored;
        };
        let id = self.fresh_id(ids);
        if let Some(parent) = self.toc_tree.get_mut(&parent_id) {
            parent.child_ids.insert(index + offset, id.clone());
        }

        self.insert_new(TocItem::new(id, item_type.default_name(), item_type, parent_id));
        ActionOutcome::Applied
    }

    fn delete(&mut self, item_id: &str) -> ActionOutcome {
        if item_id == ROOT_ID {
            return ActionOutcome::Ignored;
        }
        let Some(parent_id) = self.toc_tree.get(item_id).map(|i| i.parent_id.clone()) else {
            return ActionOutcome::Ignored;
        };

        if let Some(parent) = self.toc_tree.get_mut(&parent_id) {
            parent.child_ids.retain(|c| c != item_id);
        }
        let removed = self.subtree_ids(item_id);
        for id in &removed {
            self.toc_tree.remove(id);
        }

        if !self.contains(&self.selected_id) {
            self.selected_id = parent_id;
        }
        if self
            .renaming_id
            .as_ref()
            .is_some_and(|id| !self.contains(id))
        {
            self.renaming_id = None;
        }
        if self
            .context_menu
            .node_id
            .as_ref()
            .is_some_and(|id| !self.contains(id))
        {
            self.context_menu = ContextMenu::default();
        }
        debug!(item = item_id, removed = removed.len(), "Deleted TOC subtree");
        ActionOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_outline() {
        let state = TocState::new(&mut IdGenerator::sequential("toc"));
        let outline = state.outline();

        let rows: Vec<(usize, &str)> = outline.iter().map(|e| (e.depth, e.name.as_str())).collect();
        assert_eq!(
            rows,
            vec![(0, "Course Title"), (1, "Chapter 1"), (2, "Lesson 1")]
        );
        assert_eq!(state.selected_id, ROOT_ID);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_new_ids_never_overwrite_items() {
        let mut state = TocState::new(&mut IdGenerator::sequential("toc"));
        let mut stale = IdGenerator::sequential("toc");
        let action = TocAction::AddSiblingAfter {
            sibling_id: "toc-1".to_string(),
        };

        assert!(state.apply(&action, &mut stale).is_applied());
        assert_eq!(state.selected_id, "toc-3");
        assert_eq!(state.children(ROOT_ID).len(), 2);
        assert_eq!(state.get("toc-1").map(|i| i.name.as_str()), Some("Chapter 1"));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_subtree_ids_parents_first() {
        let state = TocState::new(&mut IdGenerator::sequential("toc"));
        assert_eq!(
            state.subtree_ids(ROOT_ID),
            vec!["ROOT".to_string(), "toc-1".to_string(), "toc-2".to_string()]
        );
        assert!(state.subtree_ids("missing").is_empty());
    }

    #[test]
    fn test_validate_catches_broken_links() {
        let mut state = TocState::new(&mut IdGenerator::sequential("toc"));
        state
            .toc_tree
            .get_mut("toc-2")
            .unwrap()
            .parent_id = ROOT_ID.to_string();
        assert!(matches!(
            state.validate(),
            Err(TocError::ParentMismatch { .. })
        ));

        let mut state = TocState::with_root("Course");
        state.toc_tree.insert(
            "stray".to_string(),
            TocItem::new("stray", "Stray", ItemType::Lesson, "gone"),
        );
        assert!(matches!(state.validate(), Err(TocError::Unreachable(id)) if id == "stray"));
    }

    #[test]
    fn test_rename_of_unknown_item_still_leaves_rename_mode() {
        let mut ids = IdGenerator::sequential("toc");
        let mut state = TocState::new(&mut ids);
        state.renaming_id = Some(ROOT_ID.to_string());

        let outcome = state.apply(
            &TocAction::Rename {
                item_id: "nope".to_string(),
                new_name: "X".to_string(),
            },
            &mut ids,
        );
        assert_eq!(outcome, ActionOutcome::Applied);
        assert_eq!(state.renaming_id, None);
    }
}
