//! Error types for codec operations
//!
//! Decoding distinguishes two outcomes:
//!
//! - [`ParseError`]: the input breaks the entity/media contract. The whole
//!   parse is rejected before tokenization.
//! - [`Degradation`]: a piece of content could not be interpreted (unknown
//!   user, disallowed link) and was emitted as plain text instead. The parse
//!   succeeds and reports these alongside the document.
//!
//! Rendering has no error path.

use std::fmt;
use thiserror::Error;

/// Input rejected during validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An entity descriptor lacks one of `indexStart`, `indexEnd`, `id`, `type`
    #[error("Required field \"{field}\" missing from the entity payload")]
    MissingField { field: &'static str },
    /// An index field is not a non-negative integer
    #[error("Invalid entity payload: {id} ({field} is not a non-negative integer)")]
    InvalidIndex { id: String, field: &'static str },
    /// `indexEnd <= indexStart`
    #[error("Invalid entity payload: {id} (start index: {start}, end index: {end})")]
    InvalidEntity { id: String, start: u64, end: u64 },
    /// A media entry whose `text` is not an array of arrays
    #[error("Invalid table payload: {payload} (index: {index})")]
    InvalidTable { payload: String, index: String },
    /// An offset past the end of the text while padding is disabled
    #[error("Entity {id} starts at {start}, past the end of the message (length {len})")]
    EntityOutOfRange { id: String, start: usize, len: usize },
    /// A reserved delimiter character in the input
    #[error("Reserved character U+{code_point:04X} found in {location}")]
    ReservedCharacter { location: String, code_point: u32 },
}

/// Content recovered as plain text during a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Mention whose user could not be resolved; `fallback` is the text used
    UnresolvedMention { id: String, fallback: String },
    /// Link whose destination failed validation
    RejectedLink { destination: String, reason: String },
    /// Entity marker of a type the parser does not know, or with an unusable id
    UnknownEntity { kind: String, id: String },
    /// Marker payload that could not be decoded
    MalformedMarker { payload: String },
    /// Markdown construct outside the enabled set, kept as literal text
    LiteralConstruct { construct: &'static str },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::UnresolvedMention { id, fallback } => {
                write!(f, "mention {id} unresolved, kept as '{fallback}'")
            }
            Degradation::RejectedLink {
                destination,
                reason,
            } => write!(f, "link '{destination}' rejected: {reason}"),
            Degradation::UnknownEntity { kind, id } => {
                write!(f, "entity {kind}:{id} kept as text")
            }
            Degradation::MalformedMarker { payload } => {
                write!(f, "malformed marker '{}'", payload.escape_debug())
            }
            Degradation::LiteralConstruct { construct } => {
                write!(f, "{construct} kept as literal text")
            }
        }
    }
}
