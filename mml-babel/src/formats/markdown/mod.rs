//! Legacy Markdown format
//!
//! Bidirectional conversion between the document tree and the legacy
//! representation: Markdown-flavoured text plus an entity index (and, when
//! parsing, a media index carrying tables).
//!
//! # Library Choice
//!
//! Parsing tokenizes with `comrak` in plain CommonMark mode. Rendering writes
//! text directly: the legacy dialect has fixed spellings (`[ title ](url)`,
//! `Table:` blocks, form summaries) that no Markdown serializer produces.
//!
//! # Element Mapping Table
//!
//! | Tree node        | Legacy text                    | Entity       | Import notes                          |
//! |------------------|--------------------------------|--------------|---------------------------------------|
//! | Text             | escaped, newlines → spaces     |              | adjacent runs merged                  |
//! | LineBreak        | `\n`                           |              | hard and soft breaks                  |
//! | Paragraph        | blank line around              |              | becomes a LineBreak between blocks    |
//! | Emphasis         | `*…*`                          |              | `*` and `_`                           |
//! | Strong           | `**…**`                        |              | `**` and `__`                         |
//! | Link             | `[ title ](url)`               | URL          | validated, rejected → destination     |
//! | BulletList       | `- item`, indented per level   |              | bullet char kept                      |
//! | OrderedList      | `5) item`                      |              | start and delimiter kept              |
//! | CodeBlock        | fenced, verbatim               |              | only three-backtick fences            |
//! | InlineCode       | backtick run                   |              | literal trimmed                       |
//! | Keyword          | `#tag` / `$TAG`                | KEYWORD      | from entity markers                   |
//! | Mention          | `@Pretty Name`                 | USER_FOLLOW  | resolved through the provider         |
//! | DateTime         | value                          | DATE_TIME    | from entity markers                   |
//! | Table            | `Table:` block, ` \| ` cells   |              | from the media index                  |
//! | Form controls    | bracketed summaries            |              | not parsed                            |
//!
//! # Lossy Conversions
//!
//! - Escaping is one-way: `\*` renders from `*` but imports as `*`.
//! - Paragraph boundaries import as single line breaks.
//! - Form controls, emoji and preformatted regions have no import path.
//! - Headings, indented code and raw HTML import as literal text.
//!
//! # Pipeline
//!
//! Import runs [`descriptors`] (validation) → [`enrich`] (marker splicing) →
//! [`tokenizer`] (slot shielding, comrak) → [`parser`] (tree walk). Export is
//! a single pass in [`serializer`].

pub mod descriptors;
pub mod enrich;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use parser::{parse, MarkdownParser, ParseOptions, Parsed};
pub use serializer::{render, render_nodes, render_with_options, RenderOptions, Rendered};
