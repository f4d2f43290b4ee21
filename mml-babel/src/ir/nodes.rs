//! Core data structures for the document tree.
//!
//! The tree is the shape the codec reads when rendering and builds when
//! parsing. Generic Markdown-like structure lives directly on [`Node`];
//! platform-specific elements (entities, tables, forms) are carried by
//! [`Node::Marker`], see [`super::markers`].

use super::markers::Marker;
use serde::{Deserialize, Serialize};

/// Version marker stamped on every parsed document.
pub const MESSAGEML_VERSION: &str = "2.0";

/// Rendering mode of a document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[serde(rename = "presentationml")]
    PresentationMl,
    #[serde(rename = "messageml")]
    MessageMl,
}

/// The root of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub format: DocumentFormat,
    pub version: String,
    pub children: Vec<Node>,
}

impl Document {
    /// A presentation-mode document at the current version.
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            format: DocumentFormat::PresentationMl,
            version: MESSAGEML_VERSION.to_string(),
            children,
        }
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Text(String),
    LineBreak,
    Paragraph(Vec<Node>),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Link(Link),
    BulletList(BulletList),
    OrderedList(OrderedList),
    ListItem(Vec<Node>),
    CodeBlock(CodeBlock),
    InlineCode(String),
    Marker(Marker),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }
}

/// A hyperlink. Only `destination` and `title` are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletList {
    pub marker: char,
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedList {
    pub start: u32,
    /// Either `.` or `)`.
    pub delimiter: char,
    pub items: Vec<Node>,
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub fence_char: char,
    pub fence_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    pub literal: String,
}

impl CodeBlock {
    pub const DEFAULT_FENCE_CHAR: char = '`';
    pub const DEFAULT_FENCE_LENGTH: usize = 3;

    /// A block fenced with three backticks.
    pub fn new(info: Option<String>, literal: impl Into<String>) -> Self {
        Self {
            fence_char: Self::DEFAULT_FENCE_CHAR,
            fence_length: Self::DEFAULT_FENCE_LENGTH,
            info,
            literal: literal.into(),
        }
    }

    pub fn fence(&self) -> String {
        std::iter::repeat(self.fence_char)
            .take(self.fence_length)
            .collect()
    }
}
