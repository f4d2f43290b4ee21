//! Render then parse: structure and entities survive the trip.

use crate::common::*;
use mml_babel::ir::nodes::{BulletList, CodeBlock, Document, Link, Node};
use mml_babel::{parse, render, Parsed, Rendered};

fn round_trip(tree: &Document) -> (Rendered, Parsed) {
    let rendered = render(tree);
    let entities = serde_json::to_value(&rendered.entities).unwrap();
    let parsed = parse(&rendered.text, Some(&entities), None, &directory()).unwrap();
    assert!(
        parsed.degradations.is_empty(),
        "unexpected degradations: {:?}",
        parsed.degradations
    );
    (rendered, parsed)
}

#[test]
fn test_plain_text() {
    let (_, parsed) = round_trip(&doc(vec![paragraph(vec![text("hello world")])]));
    assert_eq!(parsed.document.children, vec![text("hello world")]);
}

#[test]
fn test_escaped_text_reads_back_unescaped() {
    let (rendered, parsed) = round_trip(&doc(vec![text("*hello* a_b-c")]));
    assert_eq!(rendered.text, "\\*hello\\* a\\_b\\-c");
    assert_eq!(parsed.document.children, vec![text("*hello* a_b-c")]);
}

#[test]
fn test_emphasis() {
    let inline = vec![
        text("a "),
        Node::Emphasis(vec![text("b")]),
        text(" "),
        Node::Strong(vec![text("c")]),
    ];
    let (_, parsed) = round_trip(&doc(vec![paragraph(inline.clone())]));
    assert_eq!(parsed.document.children, inline);
}

#[test]
fn test_bullet_list() {
    let list = bullets(&["one", "two"]);
    let (rendered, parsed) = round_trip(&doc(vec![list.clone()]));
    assert_eq!(rendered.text, "- one\n- two\n");
    assert_eq!(parsed.document.children, vec![list]);
}

#[test]
fn test_nested_list() {
    let list = Node::BulletList(BulletList {
        marker: '-',
        items: vec![
            Node::ListItem(vec![text("outer"), bullets(&["inner"])]),
            Node::ListItem(vec![text("after")]),
        ],
    });
    let (_, parsed) = round_trip(&doc(vec![list.clone()]));
    assert_eq!(parsed.document.children, vec![list]);
}

#[test]
fn test_ordered_list() {
    let list = numbered(5, ')', &["a", "b"]);
    let (_, parsed) = round_trip(&doc(vec![list.clone()]));
    assert_eq!(parsed.document.children, vec![list]);
}

#[test]
fn test_mentions_resolve_back_with_identical_entities() {
    let inline = vec![
        text("hi "),
        mention(JANE, "jdoe", "Jane Doe"),
        text(" and "),
        mention(BOB, "bsmith", "Bob Smith"),
    ];
    let (rendered, parsed) = round_trip(&doc(vec![paragraph(inline.clone())]));
    assert_eq!(without_ordinals(&parsed.document.children), inline);

    let again = render(&parsed.document);
    assert_eq!(again.entities, rendered.entities);
}

#[test]
fn test_keywords_inside_list_items() {
    let list = Node::BulletList(BulletList {
        marker: '-',
        items: vec![
            Node::ListItem(vec![hashtag("a")]),
            Node::ListItem(vec![text("buy "), cashtag("AAPL")]),
        ],
    });
    let (rendered, parsed) = round_trip(&doc(vec![list.clone()]));
    assert_eq!(without_ordinals(&parsed.document.children), vec![list]);
    assert_eq!(render(&parsed.document).entities, rendered.entities);
}

#[test]
fn test_link_returns_through_its_url_entity() {
    let (rendered, parsed) = round_trip(&doc(vec![
        text("see "),
        link("https://rust-lang.org", Some("Rust")),
        text(" "),
        hashtag("rust"),
    ]));
    assert_eq!(
        without_ordinals(&parsed.document.children),
        vec![
            text("see "),
            Node::Link(Link {
                destination: "https://rust-lang.org".into(),
                title: Some("Rust".into()),
                children: vec![text("Rust")],
            }),
            text(" "),
            hashtag("rust"),
        ]
    );

    let again = render(&parsed.document);
    assert_eq!(again.text, rendered.text);
    assert_eq!(again.entities, rendered.entities);
}

#[test]
fn test_code_block() {
    let code = Node::CodeBlock(CodeBlock::new(Some("rust".into()), "fn main() {}"));
    let (_, parsed) = round_trip(&doc(vec![code.clone()]));
    assert_eq!(parsed.document.children, vec![code]);
}

#[test]
fn test_links_sharing_a_url_keep_their_own_titles() {
    let (rendered, parsed) = round_trip(&doc(vec![paragraph(vec![
        link("https://a.test", Some("first")),
        text(" "),
        link("https://a.test", Some("second")),
    ])]));
    assert_eq!(
        rendered.text,
        "[ first ](https://a.test) [ second ](https://a.test)\n\n"
    );

    let titles: Vec<_> = parsed
        .document
        .children
        .iter()
        .filter_map(|node| match node {
            Node::Link(link) => link.title.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
    assert_eq!(render(&parsed.document).entities, rendered.entities);
}
