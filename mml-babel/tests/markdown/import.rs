//! Import tests for the legacy format (text + entities → tree)

use crate::common::*;
use mml_babel::ir::markers::{DateTime, Keyword, KeywordKind, Marker, Mention};
use mml_babel::ir::nodes::{BulletList, DocumentFormat, Link, Node, OrderedList};
use mml_babel::{parse, Degradation, MarkdownParser, ParseError, ParseOptions, Parsed};
use serde_json::{json, Value};

fn import(text: &str, entities: Option<Value>, media: Option<Value>) -> Parsed {
    parse(text, entities.as_ref(), media.as_ref(), &directory()).unwrap()
}

fn import_err(text: &str, entities: Option<Value>, media: Option<Value>) -> ParseError {
    parse(text, entities.as_ref(), media.as_ref(), &directory()).unwrap_err()
}

fn keyword(index: usize, kind: KeywordKind, text: &str) -> Node {
    Node::Marker(Marker::Keyword(Keyword {
        index,
        ..Keyword::new(kind, text)
    }))
}

#[test]
fn test_root_is_presentation_document() {
    let parsed = import("hello", None, None);
    assert_eq!(parsed.document.format, DocumentFormat::PresentationMl);
    assert_eq!(parsed.document.version, "2.0");
    assert_eq!(parsed.document.children, vec![text("hello")]);
    assert!(parsed.degradations.is_empty());
}

#[test]
fn test_emphasis_and_strong() {
    let parsed = import("*a* **b**", None, None);
    assert_eq!(
        parsed.document.children,
        vec![
            Node::Emphasis(vec![text("a")]),
            text(" "),
            Node::Strong(vec![text("b")]),
        ]
    );
}

#[test]
fn test_lists() {
    let parsed = import("- one\n- two", None, None);
    assert_eq!(
        parsed.document.children,
        vec![Node::BulletList(BulletList {
            marker: '-',
            items: vec![
                Node::ListItem(vec![text("one")]),
                Node::ListItem(vec![text("two")]),
            ],
        })]
    );

    let parsed = import("3) a\n4) b", None, None);
    assert_eq!(
        parsed.document.children,
        vec![Node::OrderedList(OrderedList {
            start: 3,
            delimiter: ')',
            items: vec![Node::ListItem(vec![text("a")]), Node::ListItem(vec![text("b")])],
        })]
    );
}

#[test]
fn test_block_quote_and_thematic_break_leave_no_nodes() {
    let parsed = import("> quoted\n\n---\n\nafter", None, None);
    assert_eq!(
        parsed.document.children,
        vec![text("quoted"), Node::LineBreak, text("after")]
    );
}

#[test]
fn test_resolved_mention() {
    let entities = json!({"userMentions": [
        {"id": 1001, "type": "USER_FOLLOW", "indexStart": 3, "indexEnd": 12}
    ]});
    let parsed = import("hi @Jane Doe", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![
            text("hi "),
            Node::Marker(Marker::Mention(Mention {
                index: 1,
                ..Mention::new(JANE, "jdoe", "Jane Doe")
            })),
        ]
    );
}

#[test]
fn test_unresolved_mention_falls_back_and_still_counts() {
    let entities = json!([
        {"id": 9999, "type": "user_follow", "indexStart": 3, "indexEnd": 4, "prettyName": "Ghost"},
        {"id": "#t", "type": "KEYWORD", "indexStart": 5, "indexEnd": 7}
    ]);
    let parsed = import("hi x #t", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![text("hi Ghost "), keyword(2, KeywordKind::HashTag, "t")]
    );
    assert_eq!(
        parsed.degradations,
        vec![Degradation::UnresolvedMention {
            id: "9999".into(),
            fallback: "Ghost".into()
        }]
    );
}

#[test]
fn test_mention_fallback_order() {
    let entities = json!([
        {"id": "nope", "type": "USER_MENTION", "indexStart": 0, "indexEnd": 1, "email": "n@x.test"}
    ]);
    let parsed = import("x", Some(entities), None);
    assert_eq!(parsed.document.children, vec![text("n@x.test")]);

    let entities = json!([{"id": "nope", "type": "USER_MENTION", "indexStart": 0, "indexEnd": 1}]);
    let parsed = import("x", Some(entities), None);
    assert_eq!(parsed.document.children, vec![text("nope")]);
}

#[test]
fn test_keyword_ordinals_follow_document_order() {
    let entities = json!({"hashtags": [
        {"id": "#a", "type": "KEYWORD", "indexStart": 0, "indexEnd": 2},
        {"id": "$B", "type": "KEYWORD", "indexStart": 7, "indexEnd": 9, "data": {"x": 1}}
    ]});
    let parsed = import("#a and $B", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![
            keyword(1, KeywordKind::HashTag, "a"),
            text(" and "),
            Node::Marker(Marker::Keyword(Keyword {
                index: 2,
                data: Some(json!({"x": 1})),
                ..Keyword::new(KeywordKind::CashTag, "B")
            })),
        ]
    );
}

#[test]
fn test_entity_ids_never_meet_markdown_syntax() {
    let entities = json!([{"id": "#a_b*c", "type": "KEYWORD", "indexStart": 0, "indexEnd": 6}]);
    let parsed = import("#a_b*c done", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![keyword(1, KeywordKind::HashTag, "a_b*c"), text(" done")]
    );
}

#[test]
fn test_entity_inside_emphasis() {
    let entities = json!([{"id": "#rust", "type": "KEYWORD", "indexStart": 1, "indexEnd": 6}]);
    let parsed = import("*#rust*", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![Node::Emphasis(vec![keyword(1, KeywordKind::HashTag, "rust")])]
    );
}

#[test]
fn test_entity_inside_inline_code_is_plain() {
    let entities = json!([{"id": "#a", "type": "KEYWORD", "indexStart": 1, "indexEnd": 3}]);
    let parsed = import("`#a`", Some(entities), None);
    assert_eq!(parsed.document.children, vec![Node::InlineCode("#a".into())]);
}

#[test]
fn test_url_entity_becomes_link() {
    let entities = json!({"urls": [
        {"id": "https://x.test", "type": "URL", "indexStart": 3, "indexEnd": 17}
    ]});
    let parsed = import("go https://x.test now", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![
            text("go "),
            Node::Link(Link {
                destination: "https://x.test".into(),
                title: None,
                children: vec![text("https://x.test")],
            }),
            text(" now"),
        ]
    );
}

#[test]
fn test_date_time_entity() {
    let entities = json!({"datetimes": [{
        "id": "dt1", "type": "DATE_TIME", "indexStart": 4, "indexEnd": 12,
        "text": "tomorrow", "value": "2026-10-19", "format": "date"
    }]});
    let parsed = import("due tomorrow", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![
            text("due "),
            Node::Marker(Marker::DateTime(DateTime {
                entity_id: "dt1".into(),
                value: "2026-10-19".into(),
                format: Some("date".into()),
            })),
        ]
    );
}

#[test]
fn test_markdown_link_is_validated() {
    let parsed = import("[docs](https://docs.rs)", None, None);
    let [Node::Link(link)] = parsed.document.children.as_slice() else {
        panic!("expected a single link, got {:?}", parsed.document.children);
    };
    assert_eq!(link.destination, "https://docs.rs");
    assert_eq!(link.children, vec![text("docs")]);
}

#[test]
fn test_invalid_link_degrades_to_destination_text() {
    let parsed = import("[click](javascript:alert)", None, None);
    assert_eq!(parsed.document.children, vec![text("javascript:alert")]);
    assert!(matches!(
        parsed.degradations.as_slice(),
        [Degradation::RejectedLink { destination, .. }] if destination == "javascript:alert"
    ));

    let parsed = import("see [x](relative/path)", None, None);
    assert_eq!(parsed.document.children, vec![text("see relative/path")]);
}

#[test]
fn test_table_from_media() {
    let media = json!({"content": [{"index": 1, "text": [["x", "y"], ["z", 1]]}]});
    let parsed = import("ab", None, Some(media));
    let cell = |content: &str| Node::Marker(Marker::TableCell(vec![text(content)]));
    assert_eq!(
        parsed.document.children,
        vec![
            text("a"),
            Node::Marker(Marker::Table(vec![
                Node::Marker(Marker::TableRow(vec![cell("x"), cell("y")])),
                Node::Marker(Marker::TableRow(vec![cell("z"), cell("1")])),
            ])),
            text("b"),
        ]
    );
}

#[test]
fn test_table_cells_are_not_markdown() {
    let media = json!([{"index": 0, "text": [["*not emphasis*"]]}]);
    let parsed = import("x", None, Some(media));
    assert_eq!(
        parsed.document.children[0],
        Node::Marker(Marker::Table(vec![Node::Marker(Marker::TableRow(vec![
            Node::Marker(Marker::TableCell(vec![text("*not emphasis*")]))
        ]))]))
    );
}

#[test]
fn test_out_of_range_entity_pads_text() {
    let entities = json!([{"indexStart": 0, "indexEnd": 5, "id": "x", "type": "user_follow"}]);
    let parsed = import("hi", Some(entities), None);
    assert_eq!(parsed.document.children, vec![text("x")]);

    let entities = json!([{"indexStart": 5, "indexEnd": 7, "id": "#x", "type": "KEYWORD"}]);
    let parsed = import("hi", Some(entities), None);
    assert_eq!(
        parsed.document.children,
        vec![text("hi   "), keyword(1, KeywordKind::HashTag, "x")]
    );
}

#[test]
fn test_out_of_range_entity_rejected_without_padding() {
    let entities = json!([{"indexStart": 5, "indexEnd": 7, "id": "#x", "type": "KEYWORD"}]);
    let options = ParseOptions {
        pad_out_of_range: false,
        ..Default::default()
    };
    let users = directory();
    let err = MarkdownParser::with_options(&users, options)
        .parse("hi", Some(&entities), None)
        .unwrap_err();
    assert!(matches!(err, ParseError::EntityOutOfRange { start: 5, len: 2, .. }));
}

#[test]
fn test_empty_entity_span_is_rejected() {
    let entities = json!([{"indexStart": 3, "indexEnd": 3, "id": "#x", "type": "KEYWORD"}]);
    let err = import_err("abcdef", Some(entities), None);
    assert_eq!(
        err,
        ParseError::InvalidEntity {
            id: "#x".into(),
            start: 3,
            end: 3
        }
    );
}

#[test]
fn test_missing_field_is_rejected() {
    let entities = json!([{"indexStart": 0, "indexEnd": 1, "type": "KEYWORD"}]);
    let err = import_err("a", Some(entities), None);
    assert_eq!(err, ParseError::MissingField { field: "id" });
}

#[test]
fn test_flat_media_text_is_rejected() {
    let media = json!([{"index": 0, "text": ["a", "b"]}]);
    assert!(matches!(
        import_err("x", None, Some(media)),
        ParseError::InvalidTable { .. }
    ));
}

#[test]
fn test_reserved_character_in_text_is_rejected() {
    let err = import_err("a\u{1D}b", None, None);
    assert_eq!(
        err,
        ParseError::ReservedCharacter {
            location: "message text at position 1".into(),
            code_point: 0x1D
        }
    );
}

#[test]
fn test_far_out_of_range_entity_is_rejected_even_with_padding() {
    let start = 1u64 << 62;
    let entities = json!([
        {"indexStart": start, "indexEnd": start + 1, "id": "#x", "type": "KEYWORD"}
    ]);
    let err = import_err("x", Some(entities), None);
    assert!(matches!(err, ParseError::EntityOutOfRange { len: 1, .. }), "{err:?}");
}

#[test]
fn test_media_index_at_integer_limit_is_rejected() {
    let media = json!([{"index": u64::MAX, "text": [["a"]]}]);
    let err = import_err("x", None, Some(media));
    assert!(
        matches!(&err, ParseError::EntityOutOfRange { id, len: 1, .. } if id == "media"),
        "{err:?}"
    );
}

#[test]
fn test_duplicate_keywords_keep_their_own_data() {
    let entities = json!([
        {"id": "#a", "type": "KEYWORD", "indexStart": 0, "indexEnd": 2, "data": {"n": 1}},
        {"id": "#a", "type": "KEYWORD", "indexStart": 3, "indexEnd": 5, "data": {"n": 2}}
    ]);
    let parsed = import("#a #a", Some(entities), None);
    let data: Vec<_> = parsed
        .document
        .children
        .iter()
        .filter_map(|node| match node {
            Node::Marker(Marker::Keyword(keyword)) => keyword.data.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(data, vec![json!({"n": 1}), json!({"n": 2})]);
}
