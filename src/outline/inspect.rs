use super::tree::{Block, Document, Node, Section, SectionId};

/// A section together with its current linear span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionCtx {
    pub id: SectionId,
    pub level: u8,
    pub start: usize,
    pub end: usize,
}

/// Result of resolving a linear position: the chain of enclosing section
/// ids (outermost first) and the offset from the innermost section's start
/// (or from the document start when the chain is empty).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub path: Vec<SectionId>,
    pub offset: usize,
}

pub(crate) fn resolve(doc: &Document, pos: usize) -> Option<Resolved> {
    if pos > doc.size() {
        return None;
    }
    let chain = enclosing_chain(doc, pos);
    let base = chain.last().map_or(0, |ctx| ctx.start);
    Some(Resolved {
        path: chain.iter().map(|ctx| ctx.id).collect(),
        offset: pos - base,
    })
}

/// The deepest node whose span contains `pos`.
pub(crate) fn node_at(doc: &Document, pos: usize) -> Option<&Node> {
    node_at_in(&doc.roots, 0, pos)
}

fn node_at_in<'a>(children: &'a [Node], base: usize, pos: usize) -> Option<&'a Node> {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if pos >= cur && pos < cur + sz {
            if let Node::Section(sec) = node {
                let body_start = cur + sec.body_offset();
                if let Some(inner) = node_at_in(&sec.body, body_start, pos) {
                    return Some(inner);
                }
            }
            return Some(node);
        }
        cur += sz;
    }
    None
}

/// Sections strictly containing `pos`, outermost first.
pub(crate) fn enclosing_chain(doc: &Document, pos: usize) -> Vec<SectionCtx> {
    let mut chain = Vec::new();
    chain_in(&doc.roots, 0, pos, &mut chain);
    chain
}

fn chain_in(children: &[Node], base: usize, pos: usize, chain: &mut Vec<SectionCtx>) {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if let Node::Section(sec) = node {
            if pos > cur && pos < cur + sz {
                chain.push(SectionCtx {
                    id: sec.id,
                    level: sec.level,
                    start: cur,
                    end: cur + sz,
                });
                chain_in(&sec.body, cur + sec.body_offset(), pos, chain);
                return;
            }
        }
        cur += sz;
    }
}

/// Span and level of the section carrying `id`, in current coordinates.
pub(crate) fn section_span(doc: &Document, id: SectionId) -> Option<SectionCtx> {
    span_in(&doc.roots, 0, id)
}

fn span_in(children: &[Node], base: usize, id: SectionId) -> Option<SectionCtx> {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if let Node::Section(sec) = node {
            if sec.id == id {
                return Some(SectionCtx {
                    id: sec.id,
                    level: sec.level,
                    start: cur,
                    end: cur + sz,
                });
            }
            if let Some(found) = span_in(&sec.body, cur + sec.body_offset(), id) {
                return Some(found);
            }
        }
        cur += sz;
    }
    None
}

pub(crate) fn section_ref(doc: &Document, id: SectionId) -> Option<&Section> {
    ref_in(&doc.roots, id)
}

fn ref_in(children: &[Node], id: SectionId) -> Option<&Section> {
    for node in children {
        if let Node::Section(sec) = node {
            if sec.id == id {
                return Some(sec);
            }
            if let Some(found) = ref_in(&sec.body, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Start of the search window for an anchor lookup at `pos` targeting
/// `level`. Level 1 anchors to the previous top-level heading; deeper levels
/// anchor to the enclosing (or nearest preceding) root-level section.
pub(crate) fn scope_start(doc: &Document, pos: usize, level: u8) -> usize {
    let mut cur = 0;
    let mut preceding = 0;
    for node in &doc.roots {
        let sz = node.size();
        if let Node::Section(sec) = node {
            if level == 1 {
                if sec.level == 1 && cur < pos {
                    preceding = cur;
                }
            } else {
                if pos >= cur && pos < cur + sz {
                    return cur;
                }
                if cur + sz <= pos {
                    preceding = cur;
                }
            }
        }
        cur += sz;
    }
    preceding
}

/// A block intersecting a queried range, with its current span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CoveredBlock {
    pub start: usize,
    pub end: usize,
    pub block: Block,
}

/// True if `pos` addresses a character slot inside a block's text run or a
/// section title (including the slot right after the last character), as
/// opposed to a node boundary.
pub(crate) fn is_text_position(doc: &Document, pos: usize) -> bool {
    text_pos_in(&doc.roots, 0, pos)
}

fn text_pos_in(children: &[Node], base: usize, pos: usize) -> bool {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if pos >= cur && pos < cur + sz {
            return match node {
                Node::Block(block) => pos > cur && pos <= cur + 1 + block.text.chars().count(),
                Node::Section(sec) => {
                    let title_end = cur + 1 + sec.title.len();
                    if pos > cur && pos <= title_end {
                        true
                    } else {
                        text_pos_in(&sec.body, cur + sec.body_offset(), pos)
                    }
                }
            };
        }
        cur += sz;
    }
    false
}

/// The block whose span contains `pos`, if the deepest node there is one.
pub(crate) fn block_at(doc: &Document, pos: usize) -> Option<CoveredBlock> {
    block_at_in(&doc.roots, 0, pos)
}

fn block_at_in(children: &[Node], base: usize, pos: usize) -> Option<CoveredBlock> {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if pos >= cur && pos < cur + sz {
            return match node {
                Node::Block(block) => Some(CoveredBlock {
                    start: cur,
                    end: cur + sz,
                    block: block.clone(),
                }),
                Node::Section(sec) => block_at_in(&sec.body, cur + sec.body_offset(), pos),
            };
        }
        cur += sz;
    }
    None
}

/// Blocks whose span intersects `from..to`, in document order. Descends
/// through section bodies so cross-boundary selections still surface their
/// paragraph content.
pub(crate) fn covered_blocks(doc: &Document, from: usize, to: usize) -> Vec<CoveredBlock> {
    let mut out = Vec::new();
    blocks_in(&doc.roots, 0, from, to, &mut out);
    out
}

fn blocks_in(children: &[Node], base: usize, from: usize, to: usize, out: &mut Vec<CoveredBlock>) {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if cur < to && cur + sz > from {
            match node {
                Node::Block(block) => out.push(CoveredBlock {
                    start: cur,
                    end: cur + sz,
                    block: block.clone(),
                }),
                Node::Section(sec) => {
                    blocks_in(&sec.body, cur + sec.body_offset(), from, to, out);
                }
            }
        }
        cur += sz;
    }
}
