use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of options an MCQ may hold
pub const MIN_OPTIONS: usize = 2;

/// Maximum number of options an MCQ may hold
pub const MAX_OPTIONS: usize = 4;

/// Node kind tag (the closed enumeration every rule matches on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Text,
    LineBreak,
    Link,
    Mark,
    Image,
    Equation,
    Paragraph,
    Heading,
    Quote,
    List,
    ListItem,
    Code,
    HorizontalRule,
    Table,
    TableRow,
    TableCell,
    McqContainer,
    McqQuestion,
    McqOptions,
    McqOption,
    McqExplanation,
    CollapsibleContainer,
    CollapsibleTitle,
    CollapsibleContent,
}

impl NodeKind {
    /// Whether nodes of this kind own an ordered list of children
    pub fn accepts_children(self) -> bool {
        !matches!(
            self,
            NodeKind::Text
                | NodeKind::LineBreak
                | NodeKind::Image
                | NodeKind::Equation
                | NodeKind::HorizontalRule
        )
    }

    pub fn is_inline(self) -> bool {
        matches!(
            self,
            NodeKind::Text
                | NodeKind::LineBreak
                | NodeKind::Link
                | NodeKind::Mark
                | NodeKind::Image
                | NodeKind::Equation
        )
    }

    /// Whether nodes of this kind carry a persistent block id
    pub fn is_trackable(self) -> bool {
        !matches!(
            self,
            NodeKind::Root
                | NodeKind::Text
                | NodeKind::LineBreak
                | NodeKind::Link
                | NodeKind::Mark
                | NodeKind::Equation
                | NodeKind::TableRow
                | NodeKind::TableCell
        )
    }

    /// Shadow roots are never removed by generic deletion, even when emptied
    pub fn is_shadow_root(self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::McqQuestion
                | NodeKind::McqOption
                | NodeKind::McqExplanation
                | NodeKind::CollapsibleContent
        )
    }

    /// Direct children of an MCQ container
    pub fn is_mcq_part(self) -> bool {
        matches!(
            self,
            NodeKind::McqQuestion | NodeKind::McqOptions | NodeKind::McqExplanation
        )
    }

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            NodeKind::McqContainer | NodeKind::McqOptions | NodeKind::CollapsibleContainer
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Text => "text",
            NodeKind::LineBreak => "linebreak",
            NodeKind::Link => "link",
            NodeKind::Mark => "mark",
            NodeKind::Image => "image",
            NodeKind::Equation => "equation",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Quote => "quote",
            NodeKind::List => "list",
            NodeKind::ListItem => "listitem",
            NodeKind::Code => "code",
            NodeKind::HorizontalRule => "horizontalrule",
            NodeKind::Table => "table",
            NodeKind::TableRow => "tablerow",
            NodeKind::TableCell => "tablecell",
            NodeKind::McqContainer => "mcq-container",
            NodeKind::McqQuestion => "mcq-question",
            NodeKind::McqOptions => "mcq-options-container",
            NodeKind::McqOption => "mcq-option",
            NodeKind::McqExplanation => "explanation",
            NodeKind::CollapsibleContainer => "collapsible-container",
            NodeKind::CollapsibleTitle => "collapsible-title",
            NodeKind::CollapsibleContent => "collapsible-content",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-specific node attributes
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root,
    Text(TextRun),
    LineBreak,
    Link(LinkTarget),
    /// Comment highlight over inline content
    Mark { ids: Vec<String> },
    Image(ImageSource),
    Equation { equation: String, inline: bool },
    Paragraph,
    Heading { tag: HeadingTag },
    Quote,
    List { list_type: ListType, start: u32 },
    ListItem { value: u32, checked: Option<bool> },
    Code { language: Option<String> },
    HorizontalRule,
    Table,
    TableRow,
    TableCell { header_state: u32 },
    McqContainer,
    McqQuestion,
    McqOptions,
    McqOption { checked: bool },
    McqExplanation,
    CollapsibleContainer { open: bool },
    CollapsibleTitle,
    CollapsibleContent,
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root => NodeKind::Root,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::LineBreak => NodeKind::LineBreak,
            NodeData::Link(_) => NodeKind::Link,
            NodeData::Mark { .. } => NodeKind::Mark,
            NodeData::Image(_) => NodeKind::Image,
            NodeData::Equation { .. } => NodeKind::Equation,
            NodeData::Paragraph => NodeKind::Paragraph,
            NodeData::Heading { .. } => NodeKind::Heading,
            NodeData::Quote => NodeKind::Quote,
            NodeData::List { .. } => NodeKind::List,
            NodeData::ListItem { .. } => NodeKind::ListItem,
            NodeData::Code { .. } => NodeKind::Code,
            NodeData::HorizontalRule => NodeKind::HorizontalRule,
            NodeData::Table => NodeKind::Table,
            NodeData::TableRow => NodeKind::TableRow,
            NodeData::TableCell { .. } => NodeKind::TableCell,
            NodeData::McqContainer => NodeKind::McqContainer,
            NodeData::McqQuestion => NodeKind::McqQuestion,
            NodeData::McqOptions => NodeKind::McqOptions,
            NodeData::McqOption { .. } => NodeKind::McqOption,
            NodeData::McqExplanation => NodeKind::McqExplanation,
            NodeData::CollapsibleContainer { .. } => NodeKind::CollapsibleContainer,
            NodeData::CollapsibleTitle => NodeKind::CollapsibleTitle,
            NodeData::CollapsibleContent => NodeKind::CollapsibleContent,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeData::Text(TextRun::new(text))
    }
}

/// Inline text run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Bitmask of inline formats (bold, italic, ...)
    #[serde(default)]
    pub format: u32,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub mode: TextMode,
    #[serde(default)]
    pub detail: u32,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: 0,
            style: String::new(),
            mode: TextMode::Normal,
            detail: 0,
        }
    }

    /// Length in characters (caret offsets count characters, not bytes)
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Hyperlink wrapped around inline content
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkTarget {
    pub url: String,
    pub rel: Option<String>,
    pub target: Option<String>,
    pub title: Option<String>,
    /// Created by URL detection rather than by the author
    pub auto: bool,
}

impl LinkTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Inline image decorator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageSource {
    pub src: String,
    pub alt_text: String,
    /// Zero means the natural size
    pub width: f64,
    pub height: f64,
    pub max_width: f64,
    pub show_caption: bool,
    /// Caption editor state, kept as opaque JSON
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    #[default]
    Normal,
    Token,
    Segmented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Number,
    Bullet,
    Check,
}

impl ListType {
    /// HTML tag the list renders as
    pub fn tag(self) -> &'static str {
        match self {
            ListType::Number => "ol",
            ListType::Bullet | ListType::Check => "ul",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// Presentational attributes shared by element nodes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockStyle {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trackable_kinds() {
        assert!(NodeKind::Paragraph.is_trackable());
        assert!(NodeKind::McqOption.is_trackable());
        assert!(NodeKind::CollapsibleContainer.is_trackable());
        assert!(!NodeKind::Text.is_trackable());
        assert!(!NodeKind::Root.is_trackable());
        assert!(!NodeKind::TableCell.is_trackable());
        assert!(NodeKind::Image.is_trackable());
        assert!(!NodeKind::Link.is_trackable());
    }

    #[test]
    fn test_inline_kinds() {
        assert!(NodeKind::Link.is_inline());
        assert!(NodeKind::Link.accepts_children());
        assert!(NodeKind::Image.is_inline());
        assert!(!NodeKind::Image.accepts_children());
        assert!(!NodeKind::Equation.accepts_children());
        assert!(!NodeKind::Paragraph.is_inline());
    }

    #[test]
    fn test_shadow_roots() {
        assert!(NodeKind::McqQuestion.is_shadow_root());
        assert!(NodeKind::McqOption.is_shadow_root());
        assert!(NodeKind::McqExplanation.is_shadow_root());
        assert!(!NodeKind::CollapsibleTitle.is_shadow_root());
        assert!(!NodeKind::Paragraph.is_shadow_root());
    }

    #[test]
    fn test_text_run_counts_chars() {
        let run = TextRun::new("héllo");
        assert_eq!(run.len(), 5);
        assert!(!run.is_empty());
    }

    #[test]
    fn test_kind_matches_data() {
        assert_eq!(
            NodeData::CollapsibleContainer { open: true }.kind(),
            NodeKind::CollapsibleContainer
        );
        assert_eq!(NodeData::text("a").kind(), NodeKind::Text);
    }
}
