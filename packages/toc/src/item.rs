use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed id of the course root
pub const ROOT_ID: &str = "ROOT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Title,
    Chapter,
    Lesson,
}

impl ItemType {
    /// Type of an item added under this one
    pub fn child_type(self) -> ItemType {
        match self {
            ItemType::Title => ItemType::Chapter,
            ItemType::Chapter | ItemType::Lesson => ItemType::Lesson,
        }
    }

    /// Name a freshly added item starts with
    pub fn default_name(self) -> &'static str {
        match self {
            ItemType::Chapter => "Chapter",
            ItemType::Title | ItemType::Lesson => "Lesson",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Title => "title",
            ItemType::Chapter => "chapter",
            ItemType::Lesson => "lesson",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(rename = "childIDs", default)]
    pub child_ids: Vec<String>,
    /// Empty for the root
    #[serde(rename = "parentID", default)]
    pub parent_id: String,
    /// Serialized lesson document
    pub content: String,
}

impl TocItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        item_type: ItemType,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            item_type,
            child_ids: Vec::new(),
            parent_id: parent_id.into(),
            content: coursekit_editor::empty_document_json(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_types() {
        assert_eq!(ItemType::Title.child_type(), ItemType::Chapter);
        assert_eq!(ItemType::Chapter.child_type(), ItemType::Lesson);
        assert_eq!(ItemType::Lesson.child_type(), ItemType::Lesson);
    }

    #[test]
    fn test_item_serde_names() {
        let mut item = TocItem::new("c1", "Chapter 1", ItemType::Chapter, ROOT_ID);
        item.child_ids.push("l1".to_string());
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["type"], "chapter");
        assert_eq!(value["childIDs"][0], "l1");
        assert_eq!(value["parentID"], "ROOT");
        assert!(value["content"].as_str().unwrap().contains("\"root\""));
    }
}
