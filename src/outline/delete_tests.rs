use super::*;

fn para(text: &str) -> Node {
    Node::paragraph(text)
}

fn section(level: u8, title: &str, body: Vec<Node>) -> Node {
    Node::Section(Section::new(level, title).with_body(body))
}

fn editor(nodes: Vec<Node>) -> OutlineEditor {
    OutlineEditor::new(Document::with_roots(nodes))
}

#[test]
fn invalid_ranges_never_mutate() {
    let mut ed = editor(vec![para("abcd")]);
    let before = ed.document().clone();

    assert!(!ed.delete_range(5, 2));
    assert!(!ed.delete_range(0, 99));
    assert_eq!(ed.document(), &before);
}

#[test]
fn whole_document_and_single_block_selections_defer_to_the_host() {
    let mut ed = editor(vec![para("abcd"), para("ef")]);
    let size = ed.document().size();
    let before = ed.document().clone();

    assert!(!ed.delete_range(0, size));
    assert!(!ed.delete_range(1, 3));
    assert!(!ed.delete_range(2, 2));
    assert_eq!(ed.document(), &before);
}

#[test]
fn cross_block_delete_joins_the_tail_onto_the_start_block() {
    let mut ed = editor(vec![para("abcd"), para("efgh")]);

    assert!(ed.delete_range(3, 9));
    assert_eq!(ed.document().roots.len(), 1);
    assert_eq!(ed.document().roots[0].as_block().unwrap().text, "abgh");
}

#[test]
fn delete_ending_inside_a_title_keeps_the_title_remainder() {
    let mut ed = editor(vec![para("pre"), section(1, "title", vec![para("x")])]);

    assert!(ed.delete_range(3, 9));
    assert_eq!(ed.document().roots.len(), 2);
    assert_eq!(ed.document().roots[0].as_block().unwrap().text, "prle");
    assert_eq!(ed.document().roots[1].as_block().unwrap().text, "x");
}

#[test]
fn orphaned_heading_reanchors_beside_the_top_level_remainder() {
    let mut ed = editor(vec![section(
        1,
        "one",
        vec![
            para("a"),
            section(
                2,
                "two",
                vec![
                    para("b"),
                    section(
                        3,
                        "three",
                        vec![para("c"), section(2, "four", vec![para("d")])],
                    ),
                ],
            ),
        ],
    )]);
    let orphan_id = {
        let Node::Section(one) = &ed.document().roots[0] else {
            panic!("expected the level-1 root");
        };
        let Node::Section(two) = &one.body[1] else {
            panic!("expected the level-2 section");
        };
        let Node::Section(three) = &two.body[1] else {
            panic!("expected the level-3 section");
        };
        let Node::Section(four) = &three.body[1] else {
            panic!("expected the trailing level-2 section");
        };
        four.id
    };

    // from the end of "a" into the body of "three"
    assert!(ed.delete_range(6, 21));

    let Node::Section(one) = &ed.document().roots[0] else {
        panic!("expected the level-1 remainder");
    };
    assert_eq!(one.body.len(), 2);
    assert_eq!(one.body[0].as_block().unwrap().text, "ac");
    let Node::Section(four) = &one.body[1] else {
        panic!("orphan should re-anchor under the level-1 remainder");
    };
    assert_eq!(four.level, 2);
    assert_eq!(four.title.text, "four");
    assert_eq!(four.id, orphan_id);
    assert_eq!(four.body[0].as_block().unwrap().text, "d");
}

#[test]
fn backspace_at_document_start_is_a_no_op() {
    let mut ed = editor(vec![para("abc")]);
    let before = ed.document().clone();

    assert_eq!(ed.backspace(0), None);
    assert_eq!(ed.backspace(1), None);
    assert_eq!(ed.document(), &before);
}

#[test]
fn backspace_lifts_the_first_body_block_into_a_non_empty_title() {
    let mut ed = editor(vec![section(1, "T", vec![para("abc"), para("d")])]);

    assert_eq!(ed.backspace(3), Some(2));
    let Node::Section(sec) = &ed.document().roots[0] else {
        panic!("expected a section root");
    };
    assert_eq!(sec.title.text, "Tabc");
    assert_eq!(sec.body.len(), 1);
    assert_eq!(sec.body[0].as_block().unwrap().text, "d");
}

#[test]
fn backspace_dissolves_the_sole_block_into_an_empty_title() {
    let mut ed = editor(vec![section(1, "", vec![para("xy")])]);

    assert_eq!(ed.backspace(2), Some(1));
    let Node::Section(sec) = &ed.document().roots[0] else {
        panic!("expected a section root");
    };
    assert_eq!(sec.title.text, "xy");
    assert_eq!(sec.body.len(), 1);
    assert_eq!(sec.body[0].as_block().unwrap().text, "");
}

#[test]
fn backspace_with_an_empty_title_and_multiple_blocks_defers() {
    let mut ed = editor(vec![section(1, "", vec![para("x"), para("y")])]);
    assert_eq!(ed.backspace(2), None);
}

#[test]
fn backspace_elsewhere_in_the_body_defers() {
    let mut ed = editor(vec![section(1, "T", vec![para("x"), para("y")])]);
    assert_eq!(ed.backspace(6), None);
}
