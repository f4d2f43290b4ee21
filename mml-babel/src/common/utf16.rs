//! Offsets in the legacy format count UTF-16 code units, the string index
//! unit of the clients that consume entity records.

pub fn len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// The text between two UTF-16 offsets. `None` when the range is out of
/// bounds or splits a surrogate pair.
pub fn slice(text: &str, start: usize, end: usize) -> Option<String> {
    if start > end {
        return None;
    }
    let units: Vec<u16> = text.encode_utf16().collect();
    let span = units.get(start..end)?;
    String::from_utf16(span).ok()
}
