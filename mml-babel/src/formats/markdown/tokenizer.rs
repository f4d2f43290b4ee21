//! Tokenization of enriched text.
//!
//! Marker payloads hold arbitrary entity ids and cell text, which comrak
//! would otherwise read as Markdown. Before tokenizing, every marker is
//! swapped for a slot reference, `ENTITY {slot} ENTITY`, and the decoded
//! payload is kept aside. Slot references contain only the delimiter and
//! ASCII digits, which no Markdown rule touches. The parser walk splits them
//! back out of text nodes.

use crate::common::delimiters::{decode, ENTITY_DELIMITER};
use crate::ir::markers::EncodedNode;
use comrak::nodes::AstNode;
use comrak::{parse_document, Arena, ComrakOptions};

/// A marker set aside before tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Node(EncodedNode),
    /// Payload that failed to decode, kept raw.
    Malformed(String),
}

/// A piece of a text node after slot splitting.
#[derive(Debug, PartialEq, Eq)]
pub enum Piece<'t, 's> {
    Text(&'t str),
    /// A slot and its position in [`Shielded::slots`].
    Slot(usize, &'s Slot),
}

/// Enriched text with its markers replaced by slot references.
#[derive(Debug, Default)]
pub struct Shielded {
    pub source: String,
    slots: Vec<Slot>,
}

/// Replace every marker in `enriched` with a slot reference.
///
/// An opening delimiter without a closing one is dropped with the rest of
/// the text kept as is.
pub fn shield(enriched: &str) -> Shielded {
    let mut shielded = Shielded {
        source: String::with_capacity(enriched.len()),
        slots: Vec::new(),
    };
    let mut rest = enriched;
    while let Some(open) = rest.find(ENTITY_DELIMITER) {
        shielded.source.push_str(&rest[..open]);
        let after = &rest[open + ENTITY_DELIMITER.len_utf8()..];
        let Some(close) = after.find(ENTITY_DELIMITER) else {
            tracing::debug!("unterminated marker dropped");
            rest = after;
            break;
        };
        let payload = &after[..close];
        let slot = match decode(payload) {
            Ok(node) => Slot::Node(node),
            Err(err) => {
                tracing::debug!(%err, "marker payload did not decode");
                Slot::Malformed(payload.to_string())
            }
        };
        shielded.push_slot(slot);
        rest = &after[close + ENTITY_DELIMITER.len_utf8()..];
    }
    shielded.source.push_str(rest);
    shielded
}

impl Shielded {
    fn push_slot(&mut self, slot: Slot) {
        self.source.push(ENTITY_DELIMITER);
        self.source.push_str(&self.slots.len().to_string());
        self.source.push(ENTITY_DELIMITER);
        self.slots.push(slot);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Split a text node into literal runs and the slots it references.
    pub fn split<'t>(&self, text: &'t str) -> Vec<Piece<'t, '_>> {
        let mut pieces = Vec::new();
        let mut rest = text;
        while let Some((before, index, slot, after)) = self.next_slot(rest) {
            if !before.is_empty() {
                pieces.push(Piece::Text(before));
            }
            pieces.push(Piece::Slot(index, slot));
            rest = after;
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest));
        }
        pieces
    }

    /// `text` with slot references replaced by their readable form.
    pub fn plain(&self, text: &str) -> String {
        self.split(text)
            .into_iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.to_string(),
                Piece::Slot(_, Slot::Node(node)) => node.plain_text(),
                Piece::Slot(_, Slot::Malformed(payload)) => {
                    crate::common::delimiters::strip_reserved(payload).into_owned()
                }
            })
            .collect()
    }

    fn next_slot<'t>(&self, text: &'t str) -> Option<(&'t str, usize, &Slot, &'t str)> {
        let mut search_from = 0;
        loop {
            let open = search_from + text[search_from..].find(ENTITY_DELIMITER)?;
            let digits_start = open + ENTITY_DELIMITER.len_utf8();
            let close = digits_start + text[digits_start..].find(ENTITY_DELIMITER)?;
            let slot = text[digits_start..close]
                .parse::<usize>()
                .ok()
                .and_then(|index| Some((index, self.slots.get(index)?)));
            match slot {
                Some((index, slot)) => {
                    let after = &text[close + ENTITY_DELIMITER.len_utf8()..];
                    return Some((&text[..open], index, slot, after));
                }
                // Not a reference; keep looking past this delimiter.
                None => search_from = digits_start,
            }
        }
    }
}

fn comrak_options() -> ComrakOptions<'static> {
    // CommonMark core, every extension off.
    ComrakOptions::default()
}

/// Tokenize shielded source into a comrak tree allocated in `arena`.
pub fn tokenize<'a>(arena: &'a Arena<AstNode<'a>>, shielded: &Shielded) -> &'a AstNode<'a> {
    parse_document(arena, &shielded.source, &comrak_options())
}
