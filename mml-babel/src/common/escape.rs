//! Escaping of user text written into legacy markdown.

use std::borrow::Cow;

/// Characters that would be read back as markup.
const MARKDOWN_RESERVED: [char; 5] = ['_', '*', '-', '+', '`'];

/// Backslash-escape Markdown-significant characters.
///
/// A string that is nothing but one reserved character repeated (optionally
/// padded with whitespace), such as `***` or `---`, passes through
/// unchanged: users type those as separators.
pub fn escape_markdown(content: &str) -> Cow<'_, str> {
    if is_separator_line(content) || !content.contains(MARKDOWN_RESERVED) {
        return Cow::Borrowed(content);
    }

    let mut escaped = String::with_capacity(content.len() + 8);
    for c in content.chars() {
        if MARKDOWN_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

fn is_separator_line(content: &str) -> bool {
    let mut chars = content.trim().chars();
    match chars.next() {
        Some(first) if MARKDOWN_RESERVED.contains(&first) => chars.all(|c| c == first),
        _ => false,
    }
}

/// Replace line endings with single spaces.
pub fn remove_newlines(content: &str) -> Cow<'_, str> {
    if !content.contains(['\n', '\r']) {
        return Cow::Borrowed(content);
    }
    Cow::Owned(content.replace("\r\n", " ").replace(['\r', '\n'], " "))
}
