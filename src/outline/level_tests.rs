use crate::error::EngineError;

use super::level::{
    HeadingToken, find_anchor, find_prev_block, insertion_point, linearize_nodes,
    token_into_section,
};
use super::locate::HeadingMap;
use super::transaction::Transaction;
use super::*;

fn d(level: u8, start: usize, end: usize) -> HeadingDescriptor {
    HeadingDescriptor {
        level,
        start,
        end,
        depth: 0,
    }
}

fn sample_map() -> Vec<HeadingDescriptor> {
    vec![
        d(1, 150, 653),
        d(3, 194, 411),
        d(4, 229, 409),
        d(5, 298, 407),
        d(2, 411, 651),
        d(8, 470, 510),
        d(3, 510, 649),
        d(9, 566, 647),
    ]
}

#[test]
fn anchor_search_picks_the_last_entry_at_or_below_the_target_level() {
    let map = sample_map();

    let (prev, nested) = find_prev_block(&map, 3);
    assert_eq!(prev.unwrap().start, 510);
    assert!(!nested);

    let (prev, nested) = find_prev_block(&map, 9);
    assert_eq!(prev.unwrap().start, 566);
    assert!(!nested);

    let (prev, nested) = find_prev_block(&map, 1);
    assert_eq!(prev.unwrap().start, 150);
    assert!(!nested);
}

#[test]
fn anchor_search_nests_when_the_anchor_outranks_the_target() {
    let map = sample_map();

    let (prev, nested) = find_prev_block(&map, 7);
    assert_eq!(prev.unwrap().start, 510);
    assert!(nested);

    let (prev, nested) = find_prev_block(&map, 10);
    assert_eq!(prev.unwrap().start, 566);
    assert!(nested);
}

#[test]
fn anchor_search_on_an_empty_map_reports_no_anchor() {
    assert_eq!(find_prev_block(&[], 5), (None, false));
}

#[test]
fn an_empty_window_reports_missing_heading_context() {
    let map = HeadingMap::default();
    assert_eq!(find_anchor(&map, 3), Err(EngineError::MissingHeadingContext));
}

#[test]
fn find_anchor_resolves_point_and_depth_from_the_map() {
    let mut map = HeadingMap::default();
    map.insert(d(1, 0, 10));

    // nesting descends into the anchor body, one level deeper
    assert_eq!(find_anchor(&map, 2), Ok((9, 1)));
    // a sibling follows the anchor subtree at the same depth
    assert_eq!(find_anchor(&map, 1), Ok((10, 0)));
}

#[test]
fn anchor_search_falls_back_to_the_first_entry_when_every_entry_outranks() {
    let map = vec![d(5, 10, 20), d(7, 20, 30)];
    let (prev, nested) = find_prev_block(&map, 3);
    assert_eq!(prev.unwrap().start, 10);
    assert!(!nested);
}

#[test]
fn nested_insertions_land_at_the_end_of_the_anchor_body() {
    let anchor = d(2, 10, 30);
    assert_eq!(insertion_point(&anchor, false), 30);
    assert_eq!(insertion_point(&anchor, true), 29);
}

#[test]
fn linearize_flattens_nested_bodies_into_the_token_stream() {
    let fragment = vec![
        Node::paragraph("intro"),
        Node::Section(Section::new(1, "A").with_body(vec![
            Node::paragraph("a1"),
            Node::Section(Section::new(2, "B").with_body(vec![Node::paragraph("b1")])),
            Node::paragraph("a2"),
        ])),
    ];
    let (leading, tokens) = linearize_nodes(fragment);

    assert_eq!(leading.len(), 1);
    assert_eq!(leading[0].as_block().unwrap().text, "intro");
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].title, "A");
    assert_eq!(tokens[0].body.len(), 1);
    assert_eq!(tokens[1].title, "B");
    // the paragraph after B's subtree attaches to the nearest open token
    assert_eq!(tokens[1].body.len(), 2);
}

#[test]
fn materialized_tokens_never_carry_an_empty_body() {
    let doc = Document::with_roots(vec![Node::paragraph("x")]);
    let mut tx = Transaction::new(&doc);
    let sec = token_into_section(
        &mut tx,
        HeadingToken {
            id: None,
            level: 2,
            title: "t".to_string(),
            body: Vec::new(),
        },
    );

    assert_eq!(sec.body.len(), 1);
    assert_eq!(sec.level, 2);
    assert!(!sec.id.is_unassigned());
}
