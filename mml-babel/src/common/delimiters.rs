//! Reserved-character encoding for entity and table markers.
//!
//! The parser splices markers into plain text so a generic Markdown
//! tokenizer can carry them through untouched. Four ASCII information
//! separators are reserved for this:
//!
//! | name   | char    | role                                   |
//! |--------|---------|----------------------------------------|
//! | ENTITY | U+001C  | opens and closes a marker              |
//! | GROUP  | U+001D  | terminates a table row                 |
//! | RECORD | U+001E  | terminates a table cell                |
//! | FIELD  | U+001F  | separates the marker type from payload |
//!
//! ```text
//! entity:  ENTITY type FIELD id ENTITY
//! table:   ENTITY TABLE FIELD (cell RECORD)* GROUP ... ENTITY
//! ```
//!
//! None of these may appear in message text. The parser rejects input that
//! contains them and the renderer strips them from everything it writes.

use crate::ir::markers::EncodedNode;
use std::borrow::Cow;
use thiserror::Error;

pub const ENTITY_DELIMITER: char = '\u{1C}';
pub const GROUP_DELIMITER: char = '\u{1D}';
pub const RECORD_DELIMITER: char = '\u{1E}';
pub const FIELD_DELIMITER: char = '\u{1F}';

pub const RESERVED: [char; 4] = [
    ENTITY_DELIMITER,
    GROUP_DELIMITER,
    RECORD_DELIMITER,
    FIELD_DELIMITER,
];

/// Marker type of a serialized table.
pub const TABLE: &str = "TABLE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("marker payload has no field delimiter")]
    MissingField,
    #[error("marker payload has an empty type")]
    EmptyType,
}

pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// First reserved character in `text`, with its char position.
pub fn find_reserved(text: &str) -> Option<(usize, char)> {
    text.chars().enumerate().find(|(_, c)| is_reserved(*c))
}

pub fn strip_reserved(text: &str) -> Cow<'_, str> {
    if text.contains(is_reserved) {
        Cow::Owned(text.chars().filter(|c| !is_reserved(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

pub fn encode_entity(out: &mut String, kind: &str, id: &str) {
    out.push(ENTITY_DELIMITER);
    out.push_str(kind);
    out.push(FIELD_DELIMITER);
    out.push_str(id);
    out.push(ENTITY_DELIMITER);
}

pub fn encode_table<R, C>(out: &mut String, rows: R)
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    out.push(ENTITY_DELIMITER);
    out.push_str(TABLE);
    out.push(FIELD_DELIMITER);
    for row in rows {
        for cell in row {
            out.push_str(cell.as_ref());
            out.push(RECORD_DELIMITER);
        }
        out.push(GROUP_DELIMITER);
    }
    out.push(ENTITY_DELIMITER);
}

/// Decode the payload found between two ENTITY delimiters.
pub fn decode(payload: &str) -> Result<EncodedNode, MarkerError> {
    let (kind, body) = payload
        .split_once(FIELD_DELIMITER)
        .ok_or(MarkerError::MissingField)?;
    if kind.is_empty() {
        return Err(MarkerError::EmptyType);
    }

    if kind == TABLE {
        let rows = body
            .split_terminator(GROUP_DELIMITER)
            .map(|row| {
                row.split_terminator(RECORD_DELIMITER)
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        return Ok(EncodedNode::Table { rows });
    }

    Ok(EncodedNode::Entity {
        kind: kind.to_string(),
        id: body.to_string(),
    })
}
