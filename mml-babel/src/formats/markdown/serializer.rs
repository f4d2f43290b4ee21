//! Markdown rendering (document tree → legacy text + entities)
//!
//! Walks the tree in document order, writing text incrementally. Every
//! entity-producing node records its span against the length written so far,
//! so entity lists come out in render order and offsets are exact.
//!
//! List depth, the active bullet/ordinal and the preformatted flag travel
//! down the recursion in a [`Scope`] value; a subtree can never leak them to
//! its siblings.

use crate::common::delimiters::strip_reserved;
use crate::common::escape::{escape_markdown, remove_newlines};
use crate::common::utf16;
use crate::entities::{
    DateTimeEntity, Entities, EntityRecord, KeywordEntity, MentionEntity, UrlEntity,
};
use crate::ir::markers::{DateTime, Keyword, Marker, Mention};
use crate::ir::nodes::{BulletList, CodeBlock, Document, Link, Node, OrderedList};

pub const DEFAULT_INDENT: &str = "  ";
pub const DEFAULT_USER_TYPE: &str = "lc";
pub const DEFAULT_FORM_BANNER: &str = "Form (log into desktop client to answer):";

const FORM_DELIMITER: &str = "\n   \n";
const TABLE_OPEN: &str = "Table:\n---\n";
const TABLE_CLOSE: &str = "\n---\n";
const ROW_DELIMITER: &str = "\n";
const CELL_DELIMITER: &str = " | ";
const PREFORMATTED_OPEN: &str = "```\n";
const PREFORMATTED_CLOSE: &str = "\n```";

/// Knobs for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indentation written once per nesting level before a list item marker.
    pub indent: String,
    /// `userType` written into mention entities.
    pub user_type: String,
    /// Line written at the top of a form.
    pub form_banner: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            user_type: DEFAULT_USER_TYPE.to_string(),
            form_banner: DEFAULT_FORM_BANNER.to_string(),
        }
    }
}

/// Output of a render: the legacy text and its entity index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub entities: Entities,
}

/// Render a document with default options.
pub fn render(doc: &Document) -> Rendered {
    render_with_options(doc, &RenderOptions::default())
}

pub fn render_with_options(doc: &Document, options: &RenderOptions) -> Rendered {
    render_nodes(&doc.children, options)
}

/// Render a sequence of sibling nodes as if they were a document body.
pub fn render_nodes(nodes: &[Node], options: &RenderOptions) -> Rendered {
    let mut renderer = Renderer::new(options);
    renderer.render_children(nodes, Scope::default());
    tracing::debug!(
        len = renderer.writer.len,
        entities = renderer.entities.len(),
        "rendered legacy markdown"
    );
    Rendered {
        text: renderer.writer.out,
        entities: renderer.entities,
    }
}

/// Output buffer that tracks its length in UTF-16 units.
#[derive(Debug, Default)]
struct TrackingWriter {
    out: String,
    len: usize,
}

impl TrackingWriter {
    fn write(&mut self, s: &str) {
        self.out.push_str(s);
        self.len += utf16::len(s);
    }

    fn last_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    /// Newline, unless the output is empty or already ends a line.
    fn line(&mut self) {
        if matches!(self.last_char(), Some(c) if c != '\n') {
            self.write("\n");
        }
    }

    /// Blank line, under the same condition as [`TrackingWriter::line`].
    fn double_line(&mut self) {
        if matches!(self.last_char(), Some(c) if c != '\n') {
            self.write("\n\n");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet(char),
    Ordered(char),
}

/// Traversal state handed from a node to its children.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Nesting depth of the innermost enclosing list.
    depth: usize,
    /// The node whose children are being rendered is a list item.
    in_list_item: bool,
    /// Newlines in text are kept.
    preformatted: bool,
}

impl Scope {
    fn child(self) -> Self {
        Self {
            in_list_item: false,
            ..self
        }
    }
}

struct Renderer<'o> {
    options: &'o RenderOptions,
    writer: TrackingWriter,
    entities: Entities,
}

impl<'o> Renderer<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            writer: TrackingWriter::default(),
            entities: Entities::default(),
        }
    }

    fn render_children(&mut self, nodes: &[Node], scope: Scope) {
        for node in nodes {
            self.render_node(node, scope);
        }
    }

    fn render_node(&mut self, node: &Node, scope: Scope) {
        match node {
            Node::Text(text) => self.write_text(text, scope),
            Node::LineBreak => self.writer.line(),
            Node::Paragraph(children) => {
                self.writer.double_line();
                if !children.is_empty() {
                    self.render_children(children, scope.child());
                    self.writer.double_line();
                }
            }
            Node::Emphasis(children) => self.render_delimited("*", children, scope),
            Node::Strong(children) => self.render_delimited("**", children, scope),
            Node::Link(link) => self.render_link(link),
            Node::BulletList(list) => self.render_bullet_list(list, scope),
            Node::OrderedList(list) => self.render_ordered_list(list, scope),
            // An item outside of any list has no marker to write.
            Node::ListItem(children) => self.render_children(children, scope.child()),
            Node::CodeBlock(code) => self.render_code_block(code),
            Node::InlineCode(literal) => self.render_inline_code(literal),
            Node::Marker(marker) => self.render_marker(marker, scope),
        }
    }

    fn write_text(&mut self, text: &str, scope: Scope) {
        let mut content = strip_reserved(text).into_owned();
        if !scope.preformatted {
            content = remove_newlines(&content).into_owned();
        }
        self.writer.write(&escape_markdown(&content));
    }

    fn render_delimited(&mut self, delimiter: &str, children: &[Node], scope: Scope) {
        self.writer.write(delimiter);
        self.render_children(children, scope.child());
        self.writer.write(delimiter);
    }

    fn render_link(&mut self, link: &Link) {
        let destination = strip_reserved(&link.destination);
        let title = link
            .title
            .as_deref()
            .map(strip_reserved)
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| destination.clone());
        let markdown = format!("[ {title} ]({destination})");

        let start = self.writer.len;
        let end = start + utf16::len(&markdown);
        self.entities.push(EntityRecord::Url(UrlEntity {
            id: destination.to_string(),
            text: title.to_string(),
            index_start: start,
            index_end: end,
            expanded_url: destination.to_string(),
        }));
        self.writer.write(&markdown);
    }

    fn render_bullet_list(&mut self, list: &BulletList, scope: Scope) {
        self.render_list(ListKind::Bullet(list.marker), 0, &list.items, scope);
    }

    fn render_ordered_list(&mut self, list: &OrderedList, scope: Scope) {
        self.render_list(
            ListKind::Ordered(list.delimiter),
            u64::from(list.start),
            &list.items,
            scope,
        );
    }

    fn render_list(&mut self, kind: ListKind, start: u64, items: &[Node], scope: Scope) {
        self.writer.line();

        let depth = if scope.in_list_item {
            scope.depth + 1
        } else {
            scope.depth
        };
        let item_scope = Scope {
            depth,
            in_list_item: true,
            preformatted: scope.preformatted,
        };
        let indent = self.options.indent.repeat(depth);

        let mut counter = start;
        for item in items {
            let Node::ListItem(children) = item else {
                self.render_node(item, Scope { depth, ..scope.child() });
                continue;
            };
            match kind {
                ListKind::Bullet(marker) => {
                    self.writer.write(&format!("{indent}{marker} "));
                }
                ListKind::Ordered(delimiter) => {
                    self.writer.write(&format!("{indent}{counter}{delimiter} "));
                    counter += 1;
                }
            }
            self.render_children(children, item_scope);
            self.writer.line();
        }

        self.writer.line();
        self.writer.line();
    }

    fn render_code_block(&mut self, code: &CodeBlock) {
        let fence = code.fence();
        self.writer.line();
        self.writer.write(&fence);
        if let Some(info) = &code.info {
            self.writer.write(&strip_reserved(info));
        }
        self.writer.line();
        self.writer.write(&strip_reserved(&code.literal));
        self.writer.line();
        self.writer.write(&fence);
        self.writer.line();
    }

    fn render_inline_code(&mut self, literal: &str) {
        let literal = strip_reserved(literal);
        let longest_run = literal
            .split(|c| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        let fence = "`".repeat(longest_run + 1);
        let pad = if literal.starts_with('`') || literal.ends_with('`') {
            " "
        } else {
            ""
        };
        self.writer
            .write(&format!("{fence}{pad}{literal}{pad}{fence}"));
    }

    fn render_marker(&mut self, marker: &Marker, scope: Scope) {
        match marker {
            Marker::Keyword(keyword) => self.render_keyword(keyword),
            Marker::Mention(mention) => self.render_mention(mention),
            Marker::DateTime(date_time) => self.render_date_time(date_time),
            Marker::Emoji(shortcode) => {
                self.writer
                    .write(&format!(":{}:", strip_reserved(shortcode)));
            }
            Marker::Table(rows) => {
                self.writer.write(TABLE_OPEN);
                self.render_separated(rows, ROW_DELIMITER, scope);
                self.writer.write(TABLE_CLOSE);
            }
            Marker::TableRow(cells) => self.render_separated(cells, CELL_DELIMITER, scope),
            Marker::TableCell(children) => self.render_children(children, scope.child()),
            Marker::Preformatted(children) => {
                self.writer.write(PREFORMATTED_OPEN);
                let inner = Scope {
                    preformatted: true,
                    ..scope.child()
                };
                self.render_children(children, inner);
                self.writer.write(PREFORMATTED_CLOSE);
                self.writer.line();
            }
            Marker::Form(children) => {
                self.writer.write(FORM_DELIMITER);
                let banner = strip_reserved(&self.options.form_banner).into_owned();
                self.writer.write(&banner);
                self.writer.write("\n");
                self.render_children(children, scope.child());
                self.writer.write(FORM_DELIMITER);
            }
            Marker::Button(children) => {
                self.writer.write("(Button:");
                self.render_children(children, scope.child());
                self.writer.write(")");
            }
            Marker::Select(select) => {
                self.render_control("Dropdown", &select.summary(), "):\n", scope);
                self.render_children(&select.options, scope.child());
            }
            Marker::SelectOption(children) => {
                self.writer.write("- ");
                self.render_children(children, scope.child());
                self.writer.write("\n");
            }
            Marker::TextField(input) => {
                self.render_control("Text Field", &input.summary(), ")", scope)
            }
            Marker::TextArea(input) => {
                self.render_control("Text Area", &input.summary(), ")", scope)
            }
            Marker::PersonSelector(selector) => {
                self.render_control("Person Selector", &selector.summary(), ")", scope)
            }
        }
    }

    /// Render nodes with `delimiter` between consecutive siblings.
    fn render_separated(&mut self, nodes: &[Node], delimiter: &str, scope: Scope) {
        for (i, node) in nodes.iter().enumerate() {
            self.render_node(node, scope.child());
            if i + 1 < nodes.len() {
                self.writer.write(delimiter);
            }
        }
    }

    fn render_control(&mut self, name: &str, summary: &str, close: &str, scope: Scope) {
        self.writer.write("(");
        self.writer.write(name);
        self.write_text(summary, scope);
        self.writer.write(close);
    }

    fn render_keyword(&mut self, keyword: &Keyword) {
        let text = strip_reserved(&keyword.display()).into_owned();
        let data = keyword.data.clone();
        self.write_entity(&text, |id, text, index_start, index_end| {
            EntityRecord::Keyword(KeywordEntity {
                id,
                text,
                index_start,
                index_end,
                data,
            })
        });
    }

    fn render_mention(&mut self, mention: &Mention) {
        let text = strip_reserved(&mention.text).into_owned();
        let user_type = self.options.user_type.clone();
        self.write_entity(&text, |_, text, index_start, index_end| {
            EntityRecord::UserFollow(MentionEntity {
                id: mention.user_id,
                screen_name: strip_reserved(&mention.screen_name).into_owned(),
                pretty_name: strip_reserved(&mention.pretty_name).into_owned(),
                text,
                index_start,
                index_end,
                user_type,
            })
        });
    }

    fn render_date_time(&mut self, date_time: &DateTime) {
        let text = strip_reserved(&date_time.value).into_owned();
        self.write_entity(&text, |_, text, index_start, index_end| {
            EntityRecord::DateTime(DateTimeEntity {
                id: date_time.entity_id.clone(),
                value: text.clone(),
                text,
                index_start,
                index_end,
                format: date_time.format.clone(),
            })
        });
    }

    /// Write `text` and record the entity built by `record` over its span.
    /// `record` receives `(id, text, start, end)` with `id == text`.
    ///
    /// Empty text writes nothing and records nothing: an entity must cover at
    /// least one unit.
    fn write_entity<F>(&mut self, text: &str, record: F)
    where
        F: FnOnce(String, String, usize, usize) -> EntityRecord,
    {
        if text.is_empty() {
            tracing::debug!("skipping entity with empty display text");
            return;
        }
        let start = self.writer.len;
        let end = start + utf16::len(text);
        self.entities
            .push(record(text.to_string(), text.to_string(), start, end));
        self.writer.write(text);
    }
}
