//! Entity and media descriptors: collection and validation.
//!
//! Descriptors arrive as loosely shaped JSON. Any object at any depth that
//! carries `indexStart` is an entity descriptor, any object that carries
//! `index` is a media descriptor. Once an object qualifies, its own children
//! are not searched.
//!
//! Validation runs before anything else touches the text, and the first
//! violation aborts the parse.

use crate::common::delimiters::find_reserved;
use crate::error::ParseError;
use serde_json::{Map, Value};

const INDEX_START: &str = "indexStart";
const INDEX_END: &str = "indexEnd";
const MEDIA_INDEX: &str = "index";

/// A validated entity descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    /// `type`, upper-cased.
    pub kind: String,
    pub id: String,
    /// UTF-16 offsets; `start < end`.
    pub start: usize,
    pub end: usize,
    /// The whole descriptor object, for type-specific extras.
    pub fields: Map<String, Value>,
}

impl EntityDescriptor {
    /// A non-empty string field.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A validated media (table) descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub index: usize,
    pub rows: Vec<Vec<String>>,
}

pub fn collect_entities(entities: Option<&Value>) -> Result<Vec<EntityDescriptor>, ParseError> {
    let mut objects = Vec::new();
    if let Some(value) = entities {
        find_objects(value, INDEX_START, &mut objects);
    }
    objects.into_iter().map(entity_descriptor).collect()
}

pub fn collect_media(media: Option<&Value>) -> Result<Vec<MediaDescriptor>, ParseError> {
    let mut objects = Vec::new();
    if let Some(value) = media {
        find_objects(value, MEDIA_INDEX, &mut objects);
    }
    objects.into_iter().map(media_descriptor).collect()
}

/// Objects carrying `key`, in traversal order.
fn find_objects<'v>(value: &'v Value, key: &str, found: &mut Vec<&'v Map<String, Value>>) {
    match value {
        Value::Object(map) if map.contains_key(key) => found.push(map),
        Value::Object(map) => {
            for child in map.values() {
                find_objects(child, key, found);
            }
        }
        Value::Array(items) => {
            for child in items {
                find_objects(child, key, found);
            }
        }
        _ => {}
    }
}

fn entity_descriptor(object: &Map<String, Value>) -> Result<EntityDescriptor, ParseError> {
    let start = required(object, INDEX_START)?;
    let end = required(object, INDEX_END)?;
    let id = scalar_text(required(object, "id")?);
    let kind = scalar_text(required(object, "type")?).to_uppercase();

    let start = index(start, &id, INDEX_START)?;
    let end = index(end, &id, INDEX_END)?;
    if end <= start {
        return Err(ParseError::InvalidEntity {
            id,
            start: start as u64,
            end: end as u64,
        });
    }

    for (location, value) in [("entity id", &id), ("entity type", &kind)] {
        if let Some((_, c)) = find_reserved(value) {
            return Err(ParseError::ReservedCharacter {
                location: format!("{location} '{}'", value.escape_debug()),
                code_point: c as u32,
            });
        }
    }

    Ok(EntityDescriptor {
        kind,
        id,
        start,
        end,
        fields: object.clone(),
    })
}

fn required<'v>(object: &'v Map<String, Value>, field: &'static str) -> Result<&'v Value, ParseError> {
    match object.get(field) {
        Some(Value::Null) | None => Err(ParseError::MissingField { field }),
        Some(value) => Ok(value),
    }
}

fn index(value: &Value, id: &str, field: &'static str) -> Result<usize, ParseError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ParseError::InvalidIndex {
            id: id.to_string(),
            field,
        })
}

fn media_descriptor(object: &Map<String, Value>) -> Result<MediaDescriptor, ParseError> {
    let raw_index = object.get(MEDIA_INDEX).unwrap_or(&Value::Null);
    let invalid = || ParseError::InvalidTable {
        payload: Value::Object(object.clone()).to_string(),
        index: raw_index.to_string(),
    };

    let index = raw_index
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(invalid)?;

    let rows = match object.get("text") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) if matches!(rows.first(), Some(Value::Array(_))) => rows
            .iter()
            .map(|row| match row {
                Value::Array(cells) => cells.iter().map(cell_text).collect(),
                _ => Vec::new(),
            })
            .collect(),
        Some(_) => return Err(invalid()),
    };

    for cell in rows.iter().flatten() {
        if let Some((_, c)) = find_reserved(cell) {
            return Err(ParseError::ReservedCharacter {
                location: format!("table cell at index {index}"),
                code_point: c as u32,
            });
        }
    }

    Ok(MediaDescriptor { index, rows })
}

/// String form of a scalar id or type.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of a table cell. Containers contribute nothing.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}
