//! Markdown parsing (legacy text + entities → document tree)
//!
//! Pipeline: normalize → validate descriptors → enrich with markers →
//! shield markers → comrak AST → walk into [`Node`]s.
//!
//! The legacy dialect only knows paragraphs, emphasis, lists, fenced code,
//! block quotes and thematic breaks. comrak always recognizes headings,
//! indented code and raw HTML, so the walk writes those back out as the
//! literal text the author typed.

use super::descriptors::{collect_entities, collect_media, EntityDescriptor};
use super::enrich::{enrich, Enriched};
use super::tokenizer::{shield, tokenize, Piece, Shielded, Slot};
use crate::common::delimiters::{find_reserved, strip_reserved};
use crate::error::{Degradation, ParseError};
use crate::ir::markers::{DateTime, EncodedNode, Keyword, KeywordKind, Marker, Mention};
use crate::ir::nodes::{BulletList, CodeBlock, Document, Link, Node, OrderedList};
use crate::resolver::{IdentityProvider, DEFAULT_LINK_SCHEMES};
use comrak::nodes::{AstNode, ListDelimType, ListType, NodeCodeBlock, NodeValue};
use comrak::Arena;
use serde_json::Value;

const NBSP: char = '\u{A0}';

/// Knobs for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Replace non-breaking spaces with plain spaces before parsing.
    pub normalize_nbsp: bool,
    /// Pad the text when an entity starts at or past its end. When off,
    /// such entities are rejected.
    pub pad_out_of_range: bool,
    /// Link schemes accepted by the default link check.
    pub allowed_link_schemes: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize_nbsp: true,
            pad_out_of_range: true,
            allowed_link_schemes: DEFAULT_LINK_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A parsed document and the content that had to be kept as plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub document: Document,
    pub degradations: Vec<Degradation>,
}

/// Parse with default options.
pub fn parse(
    text: &str,
    entities: Option<&Value>,
    media: Option<&Value>,
    provider: &dyn IdentityProvider,
) -> Result<Parsed, ParseError> {
    MarkdownParser::new(provider).parse(text, entities, media)
}

pub struct MarkdownParser<'p> {
    provider: &'p dyn IdentityProvider,
    options: ParseOptions,
}

impl<'p> MarkdownParser<'p> {
    pub fn new(provider: &'p dyn IdentityProvider) -> Self {
        Self::with_options(provider, ParseOptions::default())
    }

    pub fn with_options(provider: &'p dyn IdentityProvider, options: ParseOptions) -> Self {
        Self { provider, options }
    }

    pub fn parse(
        &self,
        text: &str,
        entities: Option<&Value>,
        media: Option<&Value>,
    ) -> Result<Parsed, ParseError> {
        let text = if self.options.normalize_nbsp {
            text.replace(NBSP, " ")
        } else {
            text.to_string()
        };

        if let Some((position, c)) = find_reserved(&text) {
            return Err(ParseError::ReservedCharacter {
                location: format!("message text at position {position}"),
                code_point: c as u32,
            });
        }

        let entities = collect_entities(entities)?;
        let media = collect_media(media)?;
        let Enriched {
            text: enriched,
            entities: emitted,
        } = enrich(&text, &entities, &media, self.options.pad_out_of_range)?;

        let shielded = shield(&enriched);
        let arena = Arena::new();
        let root = tokenize(&arena, &shielded);

        let mut walker = Walker::new(&shielded, &emitted, self.provider, &self.options);
        let mut children = Vec::new();
        walker.walk(root, &mut children, Parent::Root);

        tracing::debug!(
            entities = entities.len(),
            tables = media.len(),
            degradations = walker.degradations.len(),
            "parsed legacy markdown"
        );

        Ok(Parsed {
            document: Document::new(children),
            degradations: walker.degradations,
        })
    }
}

/// What the nodes being walked will be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    Root,
    ListItem,
    Inline,
}

struct Walker<'a> {
    shielded: &'a Shielded,
    /// Descriptor behind each slot, by slot position.
    descriptors: Vec<Option<&'a EntityDescriptor>>,
    provider: &'a dyn IdentityProvider,
    options: &'a ParseOptions,
    /// Last ordinal handed to a keyword or mention.
    ordinal: usize,
    degradations: Vec<Degradation>,
}

impl<'a> Walker<'a> {
    /// `emitted` lists the descriptors in the order their markers appear in
    /// the enriched text, which is also the order of the entity slots.
    fn new(
        shielded: &'a Shielded,
        emitted: &[&'a EntityDescriptor],
        provider: &'a dyn IdentityProvider,
        options: &'a ParseOptions,
    ) -> Self {
        let mut emitted = emitted.iter().copied();
        let descriptors = shielded
            .slots()
            .iter()
            .map(|slot| match slot {
                Slot::Node(EncodedNode::Entity { kind, id }) => emitted
                    .next()
                    .filter(|entity| entity.kind == *kind && entity.id == *id),
                _ => None,
            })
            .collect();
        Self {
            shielded,
            descriptors,
            provider,
            options,
            ordinal: 0,
            degradations: Vec::new(),
        }
    }

    fn degrade(&mut self, degradation: Degradation) {
        tracing::debug!(%degradation, "kept as plain text");
        self.degradations.push(degradation);
    }

    fn walk_children<'n>(&mut self, node: &'n AstNode<'n>, out: &mut Vec<Node>, parent: Parent) {
        for child in node.children() {
            self.walk(child, out, parent);
        }
    }

    fn walk_into<'n>(&mut self, node: &'n AstNode<'n>, parent: Parent) -> Vec<Node> {
        let mut children = Vec::new();
        self.walk_children(node, &mut children, parent);
        children
    }

    fn walk<'n>(&mut self, node: &'n AstNode<'n>, out: &mut Vec<Node>, parent: Parent) {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Document => self.walk_children(node, out, Parent::Root),

            NodeValue::Paragraph => {
                self.block_break(node, out, parent);
                self.walk_children(node, out, parent);
            }

            NodeValue::Text(text) => self.push_text(text, out),

            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(Node::LineBreak),

            NodeValue::Emph => {
                let children = self.walk_into(node, Parent::Inline);
                out.push(Node::Emphasis(children));
            }

            NodeValue::Strong => {
                let children = self.walk_into(node, Parent::Inline);
                out.push(Node::Strong(children));
            }

            NodeValue::Code(code) => {
                out.push(Node::InlineCode(self.shielded.plain(code.literal.trim())));
            }

            NodeValue::Link(link) => {
                let destination = self.shielded.plain(&link.url);
                match self
                    .provider
                    .validate_link(&destination, &self.options.allowed_link_schemes)
                {
                    Ok(()) => {
                        let title = Some(self.shielded.plain(&link.title))
                            .filter(|title| !title.trim().is_empty());
                        let children = self.walk_into(node, Parent::Inline);
                        out.push(Node::Link(Link {
                            destination,
                            title,
                            children,
                        }));
                    }
                    Err(rejection) => {
                        self.degrade(Degradation::RejectedLink {
                            destination: destination.clone(),
                            reason: rejection.to_string(),
                        });
                        push_plain(&destination, out);
                    }
                }
            }

            NodeValue::Image(_) => self.walk_children(node, out, Parent::Inline),

            NodeValue::List(list) => {
                let items = self.walk_into(node, Parent::Inline);
                out.push(match list.list_type {
                    ListType::Bullet => Node::BulletList(BulletList {
                        marker: char::from(list.bullet_char),
                        items,
                    }),
                    ListType::Ordered => Node::OrderedList(OrderedList {
                        start: u32::try_from(list.start).unwrap_or(u32::MAX),
                        delimiter: match list.delimiter {
                            ListDelimType::Period => '.',
                            ListDelimType::Paren => ')',
                        },
                        items,
                    }),
                });
            }

            NodeValue::Item(_) => {
                let children = self.walk_into(node, Parent::ListItem);
                out.push(Node::ListItem(children));
            }

            NodeValue::CodeBlock(code) if code.fenced => self.fenced_code(code, out),

            NodeValue::CodeBlock(code) => {
                self.degrade(Degradation::LiteralConstruct {
                    construct: "indented code",
                });
                self.block_break(node, out, parent);
                self.push_lines(code.literal.trim_end_matches('\n'), out);
            }

            NodeValue::Heading(heading) => {
                self.degrade(Degradation::LiteralConstruct {
                    construct: "heading",
                });
                self.block_break(node, out, parent);
                if !heading.setext {
                    let hashes = "#".repeat(usize::from(heading.level));
                    push_plain(&format!("{hashes} "), out);
                }
                self.walk_children(node, out, Parent::Inline);
                // A level 2 underline reads as a thematic break and vanishes.
                if heading.setext && heading.level == 1 {
                    out.push(Node::LineBreak);
                    push_plain("===", out);
                }
            }

            NodeValue::HtmlBlock(html) => {
                self.degrade(Degradation::LiteralConstruct {
                    construct: "HTML block",
                });
                self.block_break(node, out, parent);
                self.push_lines(html.literal.trim_end(), out);
            }

            NodeValue::HtmlInline(html) => self.push_text(html, out),

            NodeValue::BlockQuote => self.walk_children(node, out, parent),

            NodeValue::ThematicBreak => {}

            _ => self.walk_children(node, out, parent),
        }
    }

    /// Blocks are separated by a line break, except inside list items and
    /// before the very first block of the message.
    fn block_break<'n>(&self, node: &'n AstNode<'n>, out: &mut Vec<Node>, parent: Parent) {
        let first_at_root = parent == Parent::Root && node.previous_sibling().is_none();
        if parent != Parent::ListItem && !first_at_root {
            out.push(Node::LineBreak);
        }
    }

    fn fenced_code(&mut self, code: &NodeCodeBlock, out: &mut Vec<Node>) {
        let fence_char = char::from(code.fence_char);
        let literal = self.shielded.plain(code.literal.trim());
        if fence_char == CodeBlock::DEFAULT_FENCE_CHAR
            && code.fence_length == CodeBlock::DEFAULT_FENCE_LENGTH
        {
            let info = Some(self.shielded.plain(code.info.trim())).filter(|info| !info.is_empty());
            out.push(Node::CodeBlock(CodeBlock::new(info, literal)));
        } else {
            let fence: String = std::iter::repeat(fence_char)
                .take(code.fence_length)
                .collect();
            push_plain(&format!("{fence}{literal}{fence}"), out);
        }
    }

    fn push_lines(&mut self, literal: &str, out: &mut Vec<Node>) {
        for (i, line) in literal.split('\n').enumerate() {
            if i > 0 {
                out.push(Node::LineBreak);
            }
            self.push_text(line, out);
        }
    }

    /// Push tokenizer text, expanding the slot references it carries.
    fn push_text(&mut self, text: &str, out: &mut Vec<Node>) {
        let shielded = self.shielded;
        for piece in shielded.split(text) {
            match piece {
                Piece::Text(text) => push_plain(text, out),
                Piece::Slot(index, slot) => self.push_slot(index, slot, out),
            }
        }
    }

    fn push_slot(&mut self, index: usize, slot: &Slot, out: &mut Vec<Node>) {
        match slot {
            Slot::Malformed(payload) => {
                self.degrade(Degradation::MalformedMarker {
                    payload: payload.clone(),
                });
                push_plain(&strip_reserved(payload), out);
            }
            Slot::Node(EncodedNode::Table { rows }) => out.push(table(rows)),
            Slot::Node(EncodedNode::Entity { kind, id }) => {
                let descriptor = self.descriptors.get(index).copied().flatten();
                self.push_entity(kind, id, descriptor, out)
            }
        }
    }

    fn push_entity(
        &mut self,
        kind: &str,
        id: &str,
        descriptor: Option<&EntityDescriptor>,
        out: &mut Vec<Node>,
    ) {
        match kind {
            "KEYWORD" => self.push_keyword(id, descriptor, out),
            "USER_FOLLOW" | "USER_MENTION" => self.push_mention(id, descriptor, out),
            "URL" => self.push_url(id, descriptor, out),
            "DATE_TIME" => {
                let value = descriptor
                    .and_then(|d| d.str_field("value").or_else(|| d.str_field("text")))
                    .unwrap_or(id);
                out.push(Node::Marker(Marker::DateTime(DateTime {
                    entity_id: id.to_string(),
                    value: value.to_string(),
                    format: descriptor
                        .and_then(|d| d.str_field("format"))
                        .map(str::to_string),
                })));
            }
            _ => {
                self.degrade(Degradation::UnknownEntity {
                    kind: kind.to_string(),
                    id: id.to_string(),
                });
                push_plain(id, out);
            }
        }
    }

    fn push_keyword(&mut self, id: &str, descriptor: Option<&EntityDescriptor>, out: &mut Vec<Node>) {
        let mut chars = id.chars();
        let Some(kind) = chars.next().and_then(KeywordKind::from_prefix) else {
            push_plain(id, out);
            return;
        };
        self.ordinal += 1;
        out.push(Node::Marker(Marker::Keyword(Keyword {
            index: self.ordinal,
            kind,
            text: chars.as_str().to_string(),
            data: descriptor.and_then(|d| d.fields.get("data")).cloned(),
        })));
    }

    fn push_mention(&mut self, id: &str, descriptor: Option<&EntityDescriptor>, out: &mut Vec<Node>) {
        self.ordinal += 1;
        let identity = id
            .parse::<u64>()
            .ok()
            .and_then(|user_id| Some((user_id, self.provider.resolve(user_id)?)));

        match identity {
            Some((user_id, identity)) => {
                let mention = Mention {
                    index: self.ordinal,
                    ..Mention::new(user_id, identity.screen_name, identity.pretty_name)
                };
                out.push(Node::Marker(Marker::Mention(mention)));
            }
            None => {
                let fallback = descriptor
                    .and_then(|d| {
                        d.str_field("prettyName")
                            .or_else(|| d.str_field("screenName"))
                            .or_else(|| d.str_field("email"))
                    })
                    .unwrap_or(id)
                    .to_string();
                push_plain(&fallback, out);
                self.degrade(Degradation::UnresolvedMention {
                    id: id.to_string(),
                    fallback,
                });
            }
        }
    }

    fn push_url(&mut self, id: &str, descriptor: Option<&EntityDescriptor>, out: &mut Vec<Node>) {
        let destination = descriptor
            .and_then(|d| d.str_field("expandedUrl"))
            .unwrap_or(id);
        if let Err(rejection) = self
            .provider
            .validate_link(destination, &self.options.allowed_link_schemes)
        {
            self.degrade(Degradation::RejectedLink {
                destination: destination.to_string(),
                reason: rejection.to_string(),
            });
            push_plain(destination, out);
            return;
        }

        let title = descriptor
            .and_then(|d| d.str_field("text"))
            .map(str::to_string);
        let label = title.clone().unwrap_or_else(|| destination.to_string());
        out.push(Node::Link(Link {
            destination: destination.to_string(),
            title,
            children: vec![Node::Text(label)],
        }));
    }
}

/// Append literal text, merging with a preceding text node.
fn push_plain(text: &str, out: &mut Vec<Node>) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Node::Text(text.to_string()));
    }
}

fn table(rows: &[Vec<String>]) -> Node {
    let rows = rows
        .iter()
        .map(|row| {
            let cells = row
                .iter()
                .map(|cell| {
                    let children = if cell.is_empty() {
                        Vec::new()
                    } else {
                        vec![Node::Text(cell.clone())]
                    };
                    Node::Marker(Marker::TableCell(children))
                })
                .collect();
            Node::Marker(Marker::TableRow(cells))
        })
        .collect();
    Node::Marker(Marker::Table(rows))
}
