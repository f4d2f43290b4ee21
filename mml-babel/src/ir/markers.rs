//! Marker nodes: entities, tables and form controls.
//!
//! Markers are the platform-specific part of the tree. The renderer turns
//! entity markers into text plus an entity record, and table/form markers
//! into fixed delimiter strings. The parser rebuilds entity and table markers
//! from the [`EncodedNode`]s recovered out of the intermediate encoding.

use super::nodes::Node;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Keyword(Keyword),
    Mention(Mention),
    DateTime(DateTime),
    Emoji(String),
    Table(Vec<Node>),
    TableRow(Vec<Node>),
    TableCell(Vec<Node>),
    Preformatted(Vec<Node>),
    Form(Vec<Node>),
    Button(Vec<Node>),
    Select(Select),
    SelectOption(Vec<Node>),
    TextField(TextInput),
    TextArea(TextInput),
    PersonSelector(PersonSelector),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    HashTag,
    CashTag,
}

impl KeywordKind {
    pub fn prefix(self) -> char {
        match self {
            KeywordKind::HashTag => '#',
            KeywordKind::CashTag => '$',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '#' => Some(KeywordKind::HashTag),
            '$' => Some(KeywordKind::CashTag),
            _ => None,
        }
    }
}

/// A hashtag or cashtag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// Ordinal assigned by the parser in document order. Not rendered.
    #[serde(default)]
    pub index: usize,
    pub kind: KeywordKind,
    /// Keyword text without its prefix.
    pub text: String,
    /// Opaque payload forwarded into the entity record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Keyword {
    pub fn new(kind: KeywordKind, text: impl Into<String>) -> Self {
        Self {
            index: 0,
            kind,
            text: text.into(),
            data: None,
        }
    }

    /// The keyword as it appears in text, prefix included.
    pub fn display(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.text)
    }
}

/// A user mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    #[serde(default)]
    pub index: usize,
    pub user_id: u64,
    pub screen_name: String,
    pub pretty_name: String,
    /// Display text written into the message body.
    pub text: String,
}

impl Mention {
    /// A mention displayed as `@{pretty_name}`.
    pub fn new(user_id: u64, screen_name: impl Into<String>, pretty_name: impl Into<String>) -> Self {
        let pretty_name = pretty_name.into();
        Self {
            index: 0,
            user_id,
            screen_name: screen_name.into(),
            text: format!("@{pretty_name}"),
            pretty_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTime {
    pub entity_id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A dropdown. `options` holds [`Marker::SelectOption`] nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub tooltip: Option<String>,
    #[serde(default)]
    pub options: Vec<Node>,
}

impl Select {
    pub fn summary(&self) -> String {
        bracketed_summary(
            self.placeholder.as_deref(),
            self.label.as_deref(),
            self.tooltip.as_deref(),
        )
    }
}

/// A single-line text field or a multi-line text area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub placeholder: Option<String>,
    pub initial_value: Option<String>,
    pub label: Option<String>,
    pub tooltip: Option<String>,
}

impl TextInput {
    pub fn summary(&self) -> String {
        let mut summary = bracketed_summary(
            self.placeholder.as_deref(),
            self.label.as_deref(),
            self.tooltip.as_deref(),
        );
        if let Some(value) = &self.initial_value {
            if summary.is_empty() {
                summary.push(':');
            }
            summary.push_str(value);
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonSelector {
    pub placeholder: Option<String>,
    pub label: Option<String>,
    pub tooltip: Option<String>,
}

impl PersonSelector {
    pub fn summary(&self) -> String {
        bracketed_summary(
            self.placeholder.as_deref(),
            self.label.as_deref(),
            self.tooltip.as_deref(),
        )
    }
}

/// `:[placeholder][label][tooltip]`, each segment only when present.
fn bracketed_summary(placeholder: Option<&str>, label: Option<&str>, tooltip: Option<&str>) -> String {
    let segments = [placeholder, label, tooltip];
    if segments.iter().all(Option::is_none) {
        return String::new();
    }
    let mut summary = String::from(":");
    for segment in segments.into_iter().flatten() {
        summary.push('[');
        summary.push_str(segment);
        summary.push(']');
    }
    summary
}

/// A marker recovered from the intermediate encoding, before it becomes a
/// tree node. Only exists between tokenization and the parser walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedNode {
    Entity { kind: String, id: String },
    Table { rows: Vec<Vec<String>> },
}

impl EncodedNode {
    /// Readable stand-in used where markup is not interpreted (code spans).
    pub fn plain_text(&self) -> String {
        match self {
            EncodedNode::Entity { id, .. } => id.clone(),
            EncodedNode::Table { rows } => rows
                .iter()
                .map(|row| row.join(" "))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
