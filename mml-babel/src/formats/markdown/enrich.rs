//! Enrichment: splice entity and table markers into the raw text.
//!
//! Offsets are UTF-16 units, so the walk runs over the text's UTF-16
//! encoding. At an entity start the entity marker replaces the whole span;
//! at a media index the table marker is inserted before the unit.

use super::descriptors::{EntityDescriptor, MediaDescriptor};
use crate::common::delimiters::{encode_entity, encode_table};
use crate::error::ParseError;
use std::collections::HashMap;

/// Most UTF-16 units of padding added to reach an out-of-range offset.
pub const MAX_PADDING: usize = 4096;

/// Enriched text and, in emission order, the descriptor behind each entity
/// marker it carries.
#[derive(Debug)]
pub struct Enriched<'d> {
    pub text: String,
    pub entities: Vec<&'d EntityDescriptor>,
}

/// Splice markers into `text`.
///
/// When a start offset lies at or past the end of the text, the text is
/// padded with spaces so the marker still gets emitted. With `pad` off, or
/// when the offset is more than [`MAX_PADDING`] units past the end, such
/// offsets are rejected instead.
pub fn enrich<'d>(
    text: &str,
    entities: &'d [EntityDescriptor],
    media: &[MediaDescriptor],
    pad: bool,
) -> Result<Enriched<'d>, ParseError> {
    let mut units: Vec<u16> = text.encode_utf16().collect();

    // Later descriptors win over earlier ones at the same start.
    let entity_at: HashMap<usize, &EntityDescriptor> =
        entities.iter().map(|entity| (entity.start, entity)).collect();
    let media_at: HashMap<usize, &MediaDescriptor> =
        media.iter().map(|table| (table.index, table)).collect();

    let last_start = entity_at.keys().chain(media_at.keys()).max().copied();
    if let Some(last_start) = last_start {
        if last_start >= units.len() {
            let padded_len = last_start
                .checked_add(1)
                .filter(|padded| padded - units.len() <= MAX_PADDING);
            let padded_len = match padded_len {
                Some(padded_len) if pad => padded_len,
                _ => return Err(out_of_range(&entity_at, last_start, units.len())),
            };
            tracing::debug!(
                len = units.len(),
                last_start,
                "padding text to reach entity offsets"
            );
            units.resize(padded_len, u16::from(b' '));
        }
    }

    let mut out = Vec::with_capacity(units.len() + entities.len() * 16);
    let mut emitted = Vec::new();
    let mut marker = String::new();
    let mut i = 0;
    while i < units.len() {
        if let Some(entity) = entity_at.get(&i) {
            marker.clear();
            encode_entity(&mut marker, &entity.kind, &entity.id);
            out.extend(marker.encode_utf16());
            emitted.push(*entity);
            i = i.max(entity.end - 1);
        } else if let Some(table) = media_at.get(&i) {
            marker.clear();
            encode_table(&mut marker, &table.rows);
            out.extend(marker.encode_utf16());
            out.push(units[i]);
        } else {
            out.push(units[i]);
        }
        i += 1;
    }

    Ok(Enriched {
        text: String::from_utf16_lossy(&out),
        entities: emitted,
    })
}

fn out_of_range(
    entity_at: &HashMap<usize, &EntityDescriptor>,
    start: usize,
    len: usize,
) -> ParseError {
    let id = entity_at
        .get(&start)
        .map_or_else(|| "media".to_string(), |entity| entity.id.clone());
    ParseError::EntityOutOfRange { id, start, len }
}
