use super::tree::{append_to_title, delete_span, insert_nodes, insert_text};
use super::*;

fn para(text: &str) -> Node {
    Node::paragraph(text)
}

fn section(level: u8, title: &str, body: Vec<Node>) -> Node {
    Node::Section(Section::new(level, title).with_body(body))
}

#[test]
fn node_sizes_follow_the_linear_addressing_scheme() {
    assert_eq!(para("abc").size(), 5);
    assert_eq!(para("").size(), 2);
    assert_eq!(section(1, "T", vec![para("abc")]).size(), 8);

    let doc = Document::with_roots(vec![para("ab"), section(1, "T", vec![para("abc")])]);
    assert_eq!(doc.size(), 12);
}

#[test]
fn with_roots_assigns_fresh_section_ids() {
    let doc = Document::with_roots(vec![section(1, "a", vec![section(2, "b", vec![para("")])])]);
    let Some(Node::Section(outer)) = doc.roots.first() else {
        panic!("expected a section root");
    };
    let Some(Node::Section(inner)) = outer.body.first() else {
        panic!("expected a nested section");
    };
    assert!(!outer.id.is_unassigned());
    assert!(!inner.id.is_unassigned());
    assert_ne!(outer.id, inner.id);
}

#[test]
fn insert_at_a_boundary_maps_positions_by_association() {
    let mut doc = Document::with_roots(vec![para("ab")]);
    let map = insert_nodes(&mut doc, 4, vec![para("x")]).unwrap();

    assert_eq!(doc.roots.len(), 2);
    assert_eq!(map.map(4, Assoc::Before), 4);
    assert_eq!(map.map(4, Assoc::After), 7);
    assert_eq!(map.map(2, Assoc::After), 2);
}

#[test]
fn insert_inside_block_text_splits_the_block() {
    let mut doc = Document::with_roots(vec![para("abcd")]);
    let map = insert_nodes(&mut doc, 3, vec![section(1, "T", vec![para("")])]).unwrap();

    assert_eq!(doc.roots.len(), 3);
    assert_eq!(doc.roots[0].as_block().unwrap().text, "ab");
    assert_eq!(doc.roots[2].as_block().unwrap().text, "cd");
    let splice = map.splices()[0];
    assert_eq!(splice.at, 3);
    assert_eq!(splice.added, 7);
}

#[test]
fn insert_at_text_edges_snaps_to_the_block_boundary() {
    let mut doc = Document::with_roots(vec![para("ab")]);
    insert_nodes(&mut doc, 1, vec![para("x")]).unwrap();
    assert_eq!(doc.roots[0].as_block().unwrap().text, "x");
    assert_eq!(doc.roots[1].as_block().unwrap().text, "ab");

    let mut doc = Document::with_roots(vec![para("ab")]);
    insert_nodes(&mut doc, 3, vec![para("x")]).unwrap();
    assert_eq!(doc.roots[0].as_block().unwrap().text, "ab");
    assert_eq!(doc.roots[1].as_block().unwrap().text, "x");
}

#[test]
fn insert_inside_a_title_is_clamped_to_the_body_start() {
    let mut doc = Document::with_roots(vec![section(1, "Title", vec![para("x")])]);
    insert_nodes(&mut doc, 3, vec![para("y")]).unwrap();

    let Node::Section(sec) = &doc.roots[0] else {
        panic!("expected a section root");
    };
    assert_eq!(sec.body.len(), 2);
    assert_eq!(sec.body[0].as_block().unwrap().text, "y");
    assert_eq!(sec.body[1].as_block().unwrap().text, "x");
}

#[test]
fn delete_collapses_removed_spans_in_the_map() {
    let mut doc = Document::with_roots(vec![para("ab"), para("cd")]);
    let map = delete_span(&mut doc, 0, 4).unwrap();

    assert_eq!(doc.roots.len(), 1);
    assert_eq!(doc.roots[0].as_block().unwrap().text, "cd");
    assert_eq!(map.map(2, Assoc::Before), 0);
    assert_eq!(map.map(5, Assoc::Before), 1);
}

#[test]
fn delete_inside_block_text_drains_the_covered_characters() {
    let mut doc = Document::with_roots(vec![para("abcd")]);
    delete_span(&mut doc, 2, 4).unwrap();
    assert_eq!(doc.roots[0].as_block().unwrap().text, "ad");
}

#[test]
fn delete_covering_a_header_dissolves_the_section() {
    let mut doc = Document::with_roots(vec![para("ab"), section(1, "T", vec![para("x")])]);
    delete_span(&mut doc, 2, 6).unwrap();

    assert_eq!(doc.roots.len(), 2);
    assert_eq!(doc.roots[0].as_block().unwrap().text, "a");
    assert_eq!(doc.roots[1].as_block().unwrap().text, "x");
    assert_eq!(doc.size(), 6);
}

#[test]
fn emptying_a_surviving_section_body_pads_one_empty_paragraph() {
    let mut doc = Document::with_roots(vec![section(1, "T", vec![para("x")])]);
    delete_span(&mut doc, 2, 5).unwrap();

    let Node::Section(sec) = &doc.roots[0] else {
        panic!("expected a section root");
    };
    assert_eq!(sec.body.len(), 1);
    assert_eq!(sec.body[0].as_block().unwrap().text, "");
}

#[test]
fn invalid_ranges_are_rejected_without_mutation() {
    let mut doc = Document::with_roots(vec![para("ab")]);
    let before = doc.clone();

    assert!(delete_span(&mut doc, 3, 1).is_err());
    assert!(delete_span(&mut doc, 0, 99).is_err());
    assert!(insert_nodes(&mut doc, 99, vec![para("x")]).is_err());
    assert_eq!(doc, before);
}

#[test]
fn insert_text_targets_blocks_and_titles() {
    let mut doc = Document::with_roots(vec![section(1, "T", vec![para("ab")])]);
    insert_text(&mut doc, 2, "x").unwrap();
    insert_text(&mut doc, 4, "y").unwrap();

    let Node::Section(sec) = &doc.roots[0] else {
        panic!("expected a section root");
    };
    assert_eq!(sec.title.text, "Tx");
    assert_eq!(sec.body[0].as_block().unwrap().text, "yab");
    assert!(insert_text(&mut doc, 0, "z").is_err());
}

#[test]
fn append_to_title_reports_the_old_title_end() {
    let mut doc = Document::with_roots(vec![section(1, "T", vec![para("x")])]);
    let id = doc.roots[0].as_section().unwrap().id;
    let map = append_to_title(&mut doc, id, "ail").unwrap();

    assert_eq!(doc.roots[0].as_section().unwrap().title.text, "Tail");
    assert_eq!(
        map.splices()[0],
        Splice {
            at: 2,
            removed: 0,
            added: 3
        }
    );
    assert!(append_to_title(&mut doc, SectionId::UNASSIGNED, "x").is_err());
}

#[test]
fn mapping_composes_sequential_edits() {
    let mut doc = Document::with_roots(vec![para("ab"), para("cd")]);
    let mut mapping = Mapping::default();
    mapping.push(delete_span(&mut doc, 0, 4).unwrap());
    mapping.push(insert_nodes(&mut doc, 0, vec![para("xyz")]).unwrap());

    // captured before both edits: collapses to 2, then shifts past "xyz"
    assert_eq!(mapping.map(6, Assoc::Before), 7);
    assert_eq!(mapping.len(), 2);
}
