//! Format implementations
//!
//! The legacy Markdown + entities format is the only wire format this crate
//! speaks; the document tree itself serializes through serde.

pub mod markdown;

pub use markdown::{MarkdownParser, ParseOptions, Parsed, RenderOptions, Rendered};
