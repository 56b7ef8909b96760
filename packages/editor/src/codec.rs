//! # Serialization Codec
//!
//! JSON form of a lesson document. Every node type owns its own shape:
//!
//! ```json
//! { "type": "mcq-option", "version": 1, "blockId": "…", "checked": false,
//!   "children": [ … ], "format": "", "indent": 0, "direction": null }
//! ```
//!
//! Export always writes the tracked variant of a block (`tracked-paragraph`,
//! ...) with its `blockId`. Import accepts plain and tracked variants alike
//! and reuses payload ids, minting only where none is given.
//!
//! Text runs inside a code block travel as `code-highlight`. Links, marks,
//! images and equations are inline nodes; an image caption is an opaque
//! nested editor state.
//!
//! Import is all or nothing: the payload is built into a fresh tree, and any
//! unknown type, missing attribute, unsupported version or misplaced root
//! fails the whole call. Node keys are never part of the payload.

use crate::identity::BlockIdentity;
use coursekit_schema::{
    BlockId, BlockStyle, ContentTree, Direction, HeadingTag, ImageSource, LinkTarget, ListType,
    NodeData, NodeKey, NodeKind, TextRun, TreeError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Highest node version this codec reads and the one it writes
pub const CODEC_VERSION: u32 = 1;

/// A document holding one empty paragraph
pub const EMPTY_DOCUMENT_JSON: &str = r#"{"root":{"type":"root","version":1,"children":[{"type":"paragraph","version":1,"children":[]}]}}"#;

/// Serialized form of a fresh, empty document
pub fn empty_document_json() -> String {
    EMPTY_DOCUMENT_JSON.to_string()
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Top-level node must be the root, found {0}")]
    NotARoot(&'static str),

    #[error("Root node nested inside the document")]
    NestedRoot,

    #[error("Unsupported {node_type} version {version}")]
    UnsupportedVersion { node_type: &'static str, version: u32 },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDocument {
    pub root: SerializedNode,
}

/// Attributes shared by every element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFields {
    pub version: u32,
    #[serde(default)]
    pub children: Vec<SerializedNode>,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub indent: u32,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFields {
    #[serde(rename = "blockId", default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(flatten)]
    pub element: ElementFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFields {
    pub version: u32,
    #[serde(flatten)]
    pub run: TextRun,
}

/// A text run inside a code block; the highlight class is recomputed by the
/// renderer and not kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeHighlightFields {
    #[serde(rename = "highlightType", default, skip_serializing_if = "Option::is_none")]
    pub highlight_type: Option<String>,
    #[serde(flatten)]
    pub text: TextFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkFields {
    pub url: String,
    #[serde(default)]
    pub rel: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub element: ElementFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkFields {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(flatten)]
    pub element: ElementFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFields {
    pub version: u32,
    #[serde(rename = "blockId", default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    pub src: String,
    #[serde(rename = "altText", default)]
    pub alt_text: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(rename = "maxWidth", default)]
    pub max_width: f64,
    #[serde(rename = "showCaption", default)]
    pub show_caption: bool,
    /// Nested caption editor state, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationFields {
    pub version: u32,
    pub equation: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafFields {
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFields {
    pub version: u32,
    #[serde(rename = "blockId", default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingFields {
    pub tag: HeadingTag,
    #[serde(flatten)]
    pub block: BlockFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFields {
    #[serde(rename = "listType")]
    pub list_type: ListType,
    pub start: u32,
    /// Rendered tag, derived from the list type; ignored on import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(flatten)]
    pub block: BlockFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItemFields {
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(flatten)]
    pub block: BlockFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFields {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(flatten)]
    pub block: BlockFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCellFields {
    #[serde(rename = "headerState", default)]
    pub header_state: u32,
    #[serde(flatten)]
    pub element: ElementFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionFields {
    pub checked: bool,
    #[serde(flatten)]
    pub block: BlockFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapsibleFields {
    pub open: bool,
    #[serde(flatten)]
    pub block: BlockFields,
}

/// One node of the serialized tree, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializedNode {
    #[serde(rename = "root")]
    Root(ElementFields),
    #[serde(rename = "text")]
    Text(TextFields),
    #[serde(rename = "linebreak")]
    LineBreak(LeafFields),
    #[serde(rename = "code-highlight")]
    CodeHighlight(CodeHighlightFields),
    #[serde(rename = "link")]
    Link(LinkFields),
    #[serde(rename = "autolink")]
    AutoLink(LinkFields),
    #[serde(rename = "mark")]
    Mark(MarkFields),
    #[serde(rename = "image")]
    Image(ImageFields),
    #[serde(rename = "equation")]
    Equation(EquationFields),
    #[serde(rename = "paragraph")]
    Paragraph(BlockFields),
    #[serde(rename = "tracked-paragraph")]
    TrackedParagraph(BlockFields),
    #[serde(rename = "heading")]
    Heading(HeadingFields),
    #[serde(rename = "tracked-heading")]
    TrackedHeading(HeadingFields),
    #[serde(rename = "quote")]
    Quote(BlockFields),
    #[serde(rename = "tracked-quote")]
    TrackedQuote(BlockFields),
    #[serde(rename = "list")]
    List(ListFields),
    #[serde(rename = "tracked-list")]
    TrackedList(ListFields),
    #[serde(rename = "listitem")]
    ListItem(ListItemFields),
    #[serde(rename = "tracked-listitem")]
    TrackedListItem(ListItemFields),
    #[serde(rename = "code")]
    Code(CodeFields),
    #[serde(rename = "tracked-code")]
    TrackedCode(CodeFields),
    #[serde(rename = "horizontalrule")]
    HorizontalRule(RuleFields),
    #[serde(rename = "tracked-horizontalrule")]
    TrackedHorizontalRule(RuleFields),
    #[serde(rename = "table")]
    Table(BlockFields),
    #[serde(rename = "tracked-table")]
    TrackedTable(BlockFields),
    #[serde(rename = "tablerow")]
    TableRow(ElementFields),
    #[serde(rename = "tablecell")]
    TableCell(TableCellFields),
    #[serde(rename = "mcq-container")]
    McqContainer(BlockFields),
    #[serde(rename = "mcq-question")]
    McqQuestion(BlockFields),
    #[serde(rename = "mcq-options-container")]
    McqOptions(BlockFields),
    #[serde(rename = "mcq-option")]
    McqOption(OptionFields),
    #[serde(rename = "explanation")]
    McqExplanation(BlockFields),
    #[serde(rename = "collapsible-container")]
    CollapsibleContainer(CollapsibleFields),
    #[serde(rename = "collapsible-title")]
    CollapsibleTitle(BlockFields),
    #[serde(rename = "collapsible-content")]
    CollapsibleContent(BlockFields),
}

impl SerializedNode {
    /// The `type` tag this node serializes with
    pub fn type_name(&self) -> &'static str {
        match self {
            SerializedNode::Root(_) => "root",
            SerializedNode::Text(_) => "text",
            SerializedNode::LineBreak(_) => "linebreak",
            SerializedNode::CodeHighlight(_) => "code-highlight",
            SerializedNode::Link(_) => "link",
            SerializedNode::AutoLink(_) => "autolink",
            SerializedNode::Mark(_) => "mark",
            SerializedNode::Image(_) => "image",
            SerializedNode::Equation(_) => "equation",
            SerializedNode::Paragraph(_) => "paragraph",
            SerializedNode::TrackedParagraph(_) => "tracked-paragraph",
            SerializedNode::Heading(_) => "heading",
            SerializedNode::TrackedHeading(_) => "tracked-heading",
            SerializedNode::Quote(_) => "quote",
            SerializedNode::TrackedQuote(_) => "tracked-quote",
            SerializedNode::List(_) => "list",
            SerializedNode::TrackedList(_) => "tracked-list",
            SerializedNode::ListItem(_) => "listitem",
            SerializedNode::TrackedListItem(_) => "tracked-listitem",
            SerializedNode::Code(_) => "code",
            SerializedNode::TrackedCode(_) => "tracked-code",
            SerializedNode::HorizontalRule(_) => "horizontalrule",
            SerializedNode::TrackedHorizontalRule(_) => "tracked-horizontalrule",
            SerializedNode::Table(_) => "table",
            SerializedNode::TrackedTable(_) => "tracked-table",
            SerializedNode::TableRow(_) => "tablerow",
            SerializedNode::TableCell(_) => "tablecell",
            SerializedNode::McqContainer(_) => "mcq-container",
            SerializedNode::McqQuestion(_) => "mcq-question",
            SerializedNode::McqOptions(_) => "mcq-options-container",
            SerializedNode::McqOption(_) => "mcq-option",
            SerializedNode::McqExplanation(_) => "explanation",
            SerializedNode::CollapsibleContainer(_) => "collapsible-container",
            SerializedNode::CollapsibleTitle(_) => "collapsible-title",
            SerializedNode::CollapsibleContent(_) => "collapsible-content",
        }
    }
}

// ---- import -------------------------------------------------------------

/// Node data, payload id, element attributes and children of one payload node
struct Decoded<'a> {
    data: NodeData,
    block_id: Option<&'a str>,
    element: Option<&'a ElementFields>,
    version: u32,
}

fn block(data: NodeData, fields: &BlockFields) -> Decoded<'_> {
    Decoded {
        data,
        block_id: fields.block_id.as_deref(),
        element: Some(&fields.element),
        version: fields.element.version,
    }
}

fn decode(node: &SerializedNode) -> Result<Decoded<'_>, CodecError> {
    let decoded = match node {
        SerializedNode::Root(_) => return Err(CodecError::NestedRoot),
        SerializedNode::Text(f) => Decoded {
            data: NodeData::Text(f.run.clone()),
            block_id: None,
            element: None,
            version: f.version,
        },
        SerializedNode::LineBreak(f) => Decoded {
            data: NodeData::LineBreak,
            block_id: None,
            element: None,
            version: f.version,
        },
        SerializedNode::CodeHighlight(f) => Decoded {
            data: NodeData::Text(f.text.run.clone()),
            block_id: None,
            element: None,
            version: f.text.version,
        },
        SerializedNode::Link(f) | SerializedNode::AutoLink(f) => Decoded {
            data: NodeData::Link(LinkTarget {
                url: f.url.clone(),
                rel: f.rel.clone(),
                target: f.target.clone(),
                title: f.title.clone(),
                auto: matches!(node, SerializedNode::AutoLink(_)),
            }),
            block_id: None,
            element: Some(&f.element),
            version: f.element.version,
        },
        SerializedNode::Mark(f) => Decoded {
            data: NodeData::Mark { ids: f.ids.clone() },
            block_id: None,
            element: Some(&f.element),
            version: f.element.version,
        },
        SerializedNode::Image(f) => Decoded {
            data: NodeData::Image(ImageSource {
                src: f.src.clone(),
                alt_text: f.alt_text.clone(),
                width: f.width,
                height: f.height,
                max_width: f.max_width,
                show_caption: f.show_caption,
                caption: f.caption.as_ref().map(|c| c.to_string()),
            }),
            block_id: f.block_id.as_deref(),
            element: None,
            version: f.version,
        },
        SerializedNode::Equation(f) => Decoded {
            data: NodeData::Equation {
                equation: f.equation.clone(),
                inline: f.inline,
            },
            block_id: None,
            element: None,
            version: f.version,
        },
        SerializedNode::Paragraph(f) | SerializedNode::TrackedParagraph(f) => {
            block(NodeData::Paragraph, f)
        }
        SerializedNode::Heading(f) | SerializedNode::TrackedHeading(f) => {
            block(NodeData::Heading { tag: f.tag }, &f.block)
        }
        SerializedNode::Quote(f) | SerializedNode::TrackedQuote(f) => block(NodeData::Quote, f),
        SerializedNode::List(f) | SerializedNode::TrackedList(f) => block(
            NodeData::List {
                list_type: f.list_type,
                start: f.start,
            },
            &f.block,
        ),
        SerializedNode::ListItem(f) | SerializedNode::TrackedListItem(f) => block(
            NodeData::ListItem {
                value: f.value,
                checked: f.checked,
            },
            &f.block,
        ),
        SerializedNode::Code(f) | SerializedNode::TrackedCode(f) => block(
            NodeData::Code {
                language: f.language.clone(),
            },
            &f.block,
        ),
        SerializedNode::HorizontalRule(f) | SerializedNode::TrackedHorizontalRule(f) => Decoded {
            data: NodeData::HorizontalRule,
            block_id: f.block_id.as_deref(),
            element: None,
            version: f.version,
        },
        SerializedNode::Table(f) | SerializedNode::TrackedTable(f) => block(NodeData::Table, f),
        SerializedNode::TableRow(f) => Decoded {
            data: NodeData::TableRow,
            block_id: None,
            element: Some(f),
            version: f.version,
        },
        SerializedNode::TableCell(f) => Decoded {
            data: NodeData::TableCell {
                header_state: f.header_state,
            },
            block_id: None,
            element: Some(&f.element),
            version: f.element.version,
        },
        SerializedNode::McqContainer(f) => block(NodeData::McqContainer, f),
        SerializedNode::McqQuestion(f) => block(NodeData::McqQuestion, f),
        SerializedNode::McqOptions(f) => block(NodeData::McqOptions, f),
        SerializedNode::McqOption(f) => {
            block(NodeData::McqOption { checked: f.checked }, &f.block)
        }
        SerializedNode::McqExplanation(f) => block(NodeData::McqExplanation, f),
        SerializedNode::CollapsibleContainer(f) => {
            block(NodeData::CollapsibleContainer { open: f.open }, &f.block)
        }
        SerializedNode::CollapsibleTitle(f) => block(NodeData::CollapsibleTitle, f),
        SerializedNode::CollapsibleContent(f) => block(NodeData::CollapsibleContent, f),
    };
    if decoded.version > CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion {
            node_type: node.type_name(),
            version: decoded.version,
        });
    }
    Ok(decoded)
}

fn style_of(element: &ElementFields) -> BlockStyle {
    BlockStyle {
        format: element.format.clone(),
        indent: element.indent,
        direction: element.direction,
    }
}

fn build(
    tree: &mut ContentTree,
    identity: &mut BlockIdentity,
    node: &SerializedNode,
) -> Result<NodeKey, CodecError> {
    let decoded = decode(node)?;
    let block_id = decoded
        .data
        .kind()
        .is_trackable()
        .then(|| identity.restore(decoded.block_id));
    let style = decoded.element.map(style_of).unwrap_or_default();
    let key = tree.create_with(decoded.data, block_id, style);

    if let Some(element) = decoded.element {
        for child in &element.children {
            let child_key = build(tree, identity, child)?;
            tree.append(key, child_key)?;
        }
    }
    Ok(key)
}

/// Reserve every payload id up front so ids minted for id-less nodes cannot
/// repeat one that appears later in the payload
fn reserve_payload_ids(node: &SerializedNode, identity: &mut BlockIdentity) {
    let Ok(decoded) = decode(node) else {
        return;
    };
    if let Some(id) = decoded.block_id.filter(|id| !id.is_empty()) {
        identity.reserve(&BlockId::new(id));
    }
    for child in decoded.element.map(|e| e.children.as_slice()).unwrap_or_default() {
        reserve_payload_ids(child, identity);
    }
}

/// Build a fresh tree from a serialized document
pub fn import_document(json: &str, identity: &mut BlockIdentity) -> Result<ContentTree, CodecError> {
    let document: SerializedDocument = serde_json::from_str(json)?;
    let SerializedNode::Root(root_fields) = &document.root else {
        return Err(CodecError::NotARoot(document.root.type_name()));
    };
    if root_fields.version > CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion {
            node_type: "root",
            version: root_fields.version,
        });
    }

    for child in &root_fields.children {
        reserve_payload_ids(child, identity);
    }

    let mut tree = ContentTree::new();
    let root = tree.root();
    tree.set_style(root, style_of(root_fields))?;
    for child in &root_fields.children {
        let key = build(&mut tree, identity, child)?;
        tree.append(root, key)?;
    }
    info!(nodes = tree.len(), "Imported document");
    Ok(tree)
}

// ---- export -------------------------------------------------------------

fn element_fields(tree: &ContentTree, key: NodeKey) -> Result<ElementFields, CodecError> {
    let node = tree.node(key)?;
    let children = node
        .children()
        .iter()
        .map(|c| export_node(tree, *c))
        .collect::<Result<Vec<_>, _>>()?;
    let style = node.style();
    Ok(ElementFields {
        version: CODEC_VERSION,
        children,
        format: style.format.clone(),
        indent: style.indent,
        direction: style.direction,
    })
}

fn block_fields(tree: &ContentTree, key: NodeKey) -> Result<BlockFields, CodecError> {
    Ok(BlockFields {
        block_id: tree.block_id(key).map(|id| id.as_str().to_string()),
        element: element_fields(tree, key)?,
    })
}

fn inside_code(tree: &ContentTree, key: NodeKey) -> bool {
    tree.parent(key)
        .is_some_and(|parent| tree.is_kind(parent, NodeKind::Code))
}

/// Serialize the subtree at `key`
pub fn export_node(tree: &ContentTree, key: NodeKey) -> Result<SerializedNode, CodecError> {
    let data = tree.node(key)?.data();
    let node = match data {
        NodeData::Root => SerializedNode::Root(element_fields(tree, key)?),
        NodeData::Text(run) if inside_code(tree, key) => {
            SerializedNode::CodeHighlight(CodeHighlightFields {
                highlight_type: None,
                text: TextFields {
                    version: CODEC_VERSION,
                    run: run.clone(),
                },
            })
        }
        NodeData::Text(run) => SerializedNode::Text(TextFields {
            version: CODEC_VERSION,
            run: run.clone(),
        }),
        NodeData::Link(link) => {
            let fields = LinkFields {
                url: link.url.clone(),
                rel: link.rel.clone(),
                target: link.target.clone(),
                title: link.title.clone(),
                element: element_fields(tree, key)?,
            };
            if link.auto {
                SerializedNode::AutoLink(fields)
            } else {
                SerializedNode::Link(fields)
            }
        }
        NodeData::Mark { ids } => SerializedNode::Mark(MarkFields {
            ids: ids.clone(),
            element: element_fields(tree, key)?,
        }),
        NodeData::Image(image) => SerializedNode::Image(ImageFields {
            version: CODEC_VERSION,
            block_id: tree.block_id(key).map(BlockId::to_string),
            src: image.src.clone(),
            alt_text: image.alt_text.clone(),
            width: image.width,
            height: image.height,
            max_width: image.max_width,
            show_caption: image.show_caption,
            caption: image
                .caption
                .as_deref()
                .map(serde_json::from_str::<serde_json::Value>)
                .transpose()?,
        }),
        NodeData::Equation { equation, inline } => SerializedNode::Equation(EquationFields {
            version: CODEC_VERSION,
            equation: equation.clone(),
            inline: *inline,
        }),
        NodeData::LineBreak => SerializedNode::LineBreak(LeafFields {
            version: CODEC_VERSION,
        }),
        NodeData::Paragraph => SerializedNode::TrackedParagraph(block_fields(tree, key)?),
        NodeData::Heading { tag } => SerializedNode::TrackedHeading(HeadingFields {
            tag: *tag,
            block: block_fields(tree, key)?,
        }),
        NodeData::Quote => SerializedNode::TrackedQuote(block_fields(tree, key)?),
        NodeData::List { list_type, start } => SerializedNode::TrackedList(ListFields {
            list_type: *list_type,
            start: *start,
            tag: Some(list_type.tag().to_string()),
            block: block_fields(tree, key)?,
        }),
        NodeData::ListItem { value, checked } => SerializedNode::TrackedListItem(ListItemFields {
            value: *value,
            checked: *checked,
            block: block_fields(tree, key)?,
        }),
        NodeData::Code { language } => SerializedNode::TrackedCode(CodeFields {
            language: language.clone(),
            block: block_fields(tree, key)?,
        }),
        NodeData::HorizontalRule => SerializedNode::TrackedHorizontalRule(RuleFields {
            version: CODEC_VERSION,
            block_id: tree.block_id(key).map(BlockId::to_string),
        }),
        NodeData::Table => SerializedNode::TrackedTable(block_fields(tree, key)?),
        NodeData::TableRow => SerializedNode::TableRow(element_fields(tree, key)?),
        NodeData::TableCell { header_state } => SerializedNode::TableCell(TableCellFields {
            header_state: *header_state,
            element: element_fields(tree, key)?,
        }),
        NodeData::McqContainer => SerializedNode::McqContainer(block_fields(tree, key)?),
        NodeData::McqQuestion => SerializedNode::McqQuestion(block_fields(tree, key)?),
        NodeData::McqOptions => SerializedNode::McqOptions(block_fields(tree, key)?),
        NodeData::McqOption { checked } => SerializedNode::McqOption(OptionFields {
            checked: *checked,
            block: block_fields(tree, key)?,
        }),
        NodeData::McqExplanation => SerializedNode::McqExplanation(block_fields(tree, key)?),
        NodeData::CollapsibleContainer { open } => {
            SerializedNode::CollapsibleContainer(CollapsibleFields {
                open: *open,
                block: block_fields(tree, key)?,
            })
        }
        NodeData::CollapsibleTitle => SerializedNode::CollapsibleTitle(block_fields(tree, key)?),
        NodeData::CollapsibleContent => {
            SerializedNode::CollapsibleContent(block_fields(tree, key)?)
        }
    };
    Ok(node)
}

/// Serialize the whole tree
pub fn export_document(tree: &ContentTree) -> Result<SerializedDocument, CodecError> {
    Ok(SerializedDocument {
        root: export_node(tree, tree.root())?,
    })
}

pub fn export_json(tree: &ContentTree) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&export_document(tree)?)?)
}

pub fn export_json_pretty(tree: &ContentTree) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(&export_document(tree)?)?)
}
