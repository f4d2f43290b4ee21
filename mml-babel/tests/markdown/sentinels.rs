//! The reserved delimiter characters never leak into rendered text and are
//! never accepted in parser input.

use crate::common::*;
use mml_babel::common::delimiters::{is_reserved, RESERVED};
use mml_babel::ir::nodes::Node;
use mml_babel::{parse, render, ParseError};
use proptest::prelude::*;

/// Printable ASCII plus the reserved range and its neighbours.
fn messy_string() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::char::range('\u{1A}', '\u{7E}'), 0..24)
        .prop_map(|chars| chars.into_iter().collect())
}

fn printable_string() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::char::range(' ', '~'), 0..16)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn rendered_text_never_contains_reserved_characters(
        body in messy_string(),
        tag in messy_string(),
        pretty in messy_string(),
        title in messy_string(),
        destination in messy_string(),
        cell in messy_string(),
    ) {
        let tree = doc(vec![
            paragraph(vec![text(&body), hashtag(&tag)]),
            paragraph(vec![mention(JANE, "jdoe", &pretty), link(&destination, Some(title.as_str()))]),
            bullets(&[body.as_str(), cell.as_str()]),
            Node::InlineCode(cell.clone()),
        ]);
        let rendered = render(&tree);

        prop_assert!(!rendered.text.contains(is_reserved), "{:?}", rendered.text);
        for entity in rendered.entities.iter() {
            prop_assert!(entity.matches(&rendered.text), "{:?} in {:?}", entity, rendered.text);
        }
    }

    #[test]
    fn parser_rejects_reserved_characters(
        prefix in printable_string(),
        reserved in prop::sample::select(RESERVED.to_vec()),
        suffix in printable_string(),
    ) {
        let input = format!("{prefix}{reserved}{suffix}");
        let result = parse(&input, None, None, &directory());
        prop_assert!(
            matches!(
                result,
                Err(ParseError::ReservedCharacter { code_point, .. }) if code_point == reserved as u32
            ),
            "{:?}",
            result
        );
    }
}
