use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::transaction::{PositionMap, Splice};

/// Stable identity of a section. Assigned once by the owning document and
/// never reused; references by id stay valid across structural edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(u64);

impl SectionId {
    /// Placeholder for sections built outside a document. The document
    /// assigns a real id when the node is adopted.
    pub const UNASSIGNED: SectionId = SectionId(0);

    pub fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

/// Opaque leaf content. The engine moves, copies and splits blocks but never
/// interprets their payload beyond the linear text length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    List,
    Table,
    Code,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            text: text.into(),
        }
    }

    pub fn empty() -> Self {
        Self::paragraph("")
    }

    pub fn is_empty(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    pub fn size(&self) -> usize {
        2 + self.text.chars().count()
    }
}

/// Inline title content. Opaque to the engine apart from its length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineContent {
    pub text: String,
}

impl InlineContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A heading plus its nested body. `level` is the outline rank (1 = top) and
/// is independent of the section's actual depth in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub level: u8,
    pub title: InlineContent,
    pub body: Vec<Node>,
}

impl Section {
    pub fn new(level: u8, title: impl Into<String>) -> Self {
        Self {
            id: SectionId::UNASSIGNED,
            level,
            title: InlineContent::new(title),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    pub fn size(&self) -> usize {
        2 + self.title.len() + content_size(&self.body)
    }

    /// Position of the first body slot, relative to the section start.
    pub fn body_offset(&self) -> usize {
        1 + self.title.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Section(Section),
    Block(Block),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::Block(Block::paragraph(text))
    }

    pub fn size(&self) -> usize {
        match self {
            Node::Section(sec) => sec.size(),
            Node::Block(block) => block.size(),
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(sec) => Some(sec),
            Node::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Section(_) => None,
        }
    }
}

pub fn content_size(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::size).sum()
}

/// Ordered forest of sections and blocks. The root carries an implicit
/// level 0; every position in `0..size()` addresses exactly one node
/// boundary or character slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub roots: Vec<Node>,
    next_id: u64,
}

impl Document {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            next_id: 1,
        }
    }

    /// Builds a document and assigns ids to every section that does not
    /// carry one yet.
    pub fn with_roots(nodes: Vec<Node>) -> Self {
        let mut doc = Self::new();
        doc.roots = nodes;
        let mut next = doc.next_id;
        adopt_nodes(&mut doc.roots, &mut next);
        doc.next_id = next;
        doc
    }

    pub fn size(&self) -> usize {
        content_size(&self.roots)
    }

    pub(crate) fn allocate_id(&mut self) -> SectionId {
        let id = SectionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn ensure_initialized(&mut self) {
        if self.roots.is_empty() {
            self.roots.push(Node::Block(Block::empty()));
        }
    }
}

fn adopt_nodes(nodes: &mut [Node], next_id: &mut u64) {
    for node in nodes {
        if let Node::Section(sec) = node {
            if sec.id.is_unassigned() {
                sec.id = SectionId(*next_id);
                *next_id += 1;
            }
            adopt_nodes(&mut sec.body, next_id);
        }
    }
}

pub(crate) fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }
    for (count, (byte_idx, _)) in text.char_indices().enumerate() {
        if count == char_idx {
            return byte_idx;
        }
    }
    text.len()
}

// ============================================================================
// Structural mutation primitives
// ============================================================================

/// Inserts `nodes` at `pos`. A position inside a block's text splits the
/// block around the inserted content; a position inside a section title is
/// clamped to the start of that section's body.
pub(crate) fn insert_nodes(
    doc: &mut Document,
    pos: usize,
    nodes: Vec<Node>,
) -> Result<PositionMap, EngineError> {
    if pos > doc.size() {
        return Err(EngineError::InvalidPositionRange { from: pos, to: pos });
    }
    let splice = insert_into(&mut doc.roots, 0, pos, nodes)?;
    Ok(PositionMap::single(splice))
}

fn insert_into(
    children: &mut Vec<Node>,
    base: usize,
    pos: usize,
    nodes: Vec<Node>,
) -> Result<Splice, EngineError> {
    let total = content_size(&nodes);
    let mut cur = base;
    let mut i = 0;
    while i < children.len() {
        let sz = children[i].size();
        if pos == cur {
            children.splice(i..i, nodes);
            return Ok(Splice {
                at: pos,
                removed: 0,
                added: total,
            });
        }
        if pos < cur + sz {
            match &mut children[i] {
                Node::Block(block) => {
                    let chars = block.text.chars().count();
                    let off = pos - cur - 1;
                    if off == 0 {
                        children.splice(i..i, nodes);
                        return Ok(Splice {
                            at: cur,
                            removed: 0,
                            added: total,
                        });
                    }
                    if off >= chars {
                        children.splice(i + 1..i + 1, nodes);
                        return Ok(Splice {
                            at: cur + sz,
                            removed: 0,
                            added: total,
                        });
                    }
                    // Split the block; its tail becomes a sibling that
                    // follows the inserted content.
                    let byte = char_to_byte_idx(&block.text, off);
                    let tail = block.text.split_off(byte);
                    let tail_block = Node::Block(Block {
                        kind: block.kind,
                        text: tail,
                    });
                    let mut inserted = nodes;
                    inserted.push(tail_block);
                    children.splice(i + 1..i + 1, inserted);
                    return Ok(Splice {
                        at: pos,
                        removed: 0,
                        added: total + 2,
                    });
                }
                Node::Section(sec) => {
                    let body_start = cur + sec.body_offset();
                    let clamped = pos.max(body_start).min(cur + sz - 1);
                    return insert_into(&mut sec.body, body_start, clamped, nodes);
                }
            }
        }
        cur += sz;
        i += 1;
    }
    if pos == cur {
        children.extend(nodes);
        return Ok(Splice {
            at: pos,
            removed: 0,
            added: total,
        });
    }
    Err(EngineError::InvalidPositionRange { from: pos, to: pos })
}

/// Inserts inline text at `pos`, which must sit inside (or at the end of) a
/// block's text run or a section title.
pub(crate) fn insert_text(
    doc: &mut Document,
    pos: usize,
    text: &str,
) -> Result<PositionMap, EngineError> {
    if text.is_empty() {
        return Ok(PositionMap::default());
    }
    if pos > doc.size() {
        return Err(EngineError::InvalidPositionRange { from: pos, to: pos });
    }
    let added = text.chars().count();
    if insert_text_into(&mut doc.roots, 0, pos, text) {
        Ok(PositionMap::single(Splice {
            at: pos,
            removed: 0,
            added,
        }))
    } else {
        Err(EngineError::InvalidPositionRange { from: pos, to: pos })
    }
}

fn insert_text_into(children: &mut [Node], base: usize, pos: usize, text: &str) -> bool {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if pos < cur + sz {
            return match node {
                Node::Block(block) => {
                    if pos <= cur {
                        return false;
                    }
                    let off = (pos - cur - 1).min(block.text.chars().count());
                    let byte = char_to_byte_idx(&block.text, off);
                    block.text.insert_str(byte, text);
                    true
                }
                Node::Section(sec) => {
                    let title_end = cur + 1 + sec.title.len();
                    let body_start = cur + sec.body_offset();
                    if pos > cur && pos <= title_end {
                        let byte = char_to_byte_idx(&sec.title.text, pos - cur - 1);
                        sec.title.text.insert_str(byte, text);
                        true
                    } else if pos >= body_start && pos < cur + sz - 1 {
                        insert_text_into(&mut sec.body, body_start, pos, text)
                    } else {
                        false
                    }
                }
            };
        }
        cur += sz;
    }
    false
}

/// Deletes the span `from..to`. Fully covered nodes are removed; partially
/// covered blocks lose the covered characters; a section whose header falls
/// inside the span is dissolved into its surviving body. A surviving section
/// whose body was emptied is padded with one empty paragraph.
pub(crate) fn delete_span(
    doc: &mut Document,
    from: usize,
    to: usize,
) -> Result<PositionMap, EngineError> {
    let size = doc.size();
    if from > to || to > size {
        return Err(EngineError::InvalidPositionRange { from, to });
    }
    if from == to {
        return Ok(PositionMap::default());
    }
    let mut splices = Vec::new();
    delete_in(&mut doc.roots, 0, from, to, &mut splices);
    if doc.roots.is_empty() {
        doc.roots.push(Node::Block(Block::empty()));
        splices.push(Splice {
            at: to,
            removed: 0,
            added: 2,
        });
    }
    Ok(PositionMap::new(splices))
}

fn delete_in(
    children: &mut Vec<Node>,
    base: usize,
    from: usize,
    to: usize,
    splices: &mut Vec<Splice>,
) {
    let mut cur = base;
    let mut i = 0;
    while i < children.len() {
        let sz = children[i].size();
        let start = cur;
        let end = cur + sz;
        if to <= start {
            break;
        }
        if from >= end {
            cur = end;
            i += 1;
            continue;
        }
        if from <= start && to >= end {
            children.remove(i);
            splices.push(Splice {
                at: start,
                removed: sz,
                added: 0,
            });
            cur = end;
            continue;
        }
        let is_block = matches!(children[i], Node::Block(_));
        if is_block {
            let Node::Block(block) = &mut children[i] else {
                unreachable!()
            };
            let text_start = start + 1;
            let chars = block.text.chars().count();
            let cut_from = from.max(text_start);
            let cut_to = to.min(text_start + chars);
            if cut_from < cut_to {
                let a = char_to_byte_idx(&block.text, cut_from - text_start);
                let b = char_to_byte_idx(&block.text, cut_to - text_start);
                block.text.drain(a..b);
                splices.push(Splice {
                    at: cut_from,
                    removed: cut_to - cut_from,
                    added: 0,
                });
            }
            cur = end;
            i += 1;
        } else if from <= start {
            // Header covered but subtree not: dissolve the section. Any
            // surviving title text turns into a plain paragraph ahead of the
            // inlined body remainder.
            let Node::Section(sec) = children.remove(i) else {
                unreachable!()
            };
            let title_len = sec.title.len();
            let body_start = start + 1 + title_len;
            let body_end = end - 1;
            let covered_title = to.min(body_start).saturating_sub(start + 1);
            let mut replacement = Vec::new();
            let remainder = &sec.title.text[char_to_byte_idx(&sec.title.text, covered_title)..];
            let added = if remainder.is_empty() {
                0
            } else {
                replacement.push(Node::Block(Block::paragraph(remainder)));
                2 + (title_len - covered_title)
            };
            splices.push(Splice {
                at: start,
                removed: 1 + title_len,
                added,
            });
            let mut body = sec.body;
            if to > body_start {
                delete_in(
                    &mut body,
                    body_start,
                    from.max(body_start),
                    to.min(body_end),
                    splices,
                );
            }
            replacement.extend(body);
            splices.push(Splice {
                at: body_end,
                removed: 1,
                added: 0,
            });
            children.splice(i..i, replacement);
            break;
        } else {
            let Node::Section(sec) = &mut children[i] else {
                unreachable!()
            };
            let title_len = sec.title.len();
            let body_start = start + 1 + title_len;
            let body_end = end - 1;
            if from < body_start {
                let cut_from = from.max(start + 1);
                let cut_to = to.min(body_start);
                if cut_from < cut_to {
                    let a = char_to_byte_idx(&sec.title.text, cut_from - start - 1);
                    let b = char_to_byte_idx(&sec.title.text, cut_to - start - 1);
                    sec.title.text.drain(a..b);
                    splices.push(Splice {
                        at: cut_from,
                        removed: cut_to - cut_from,
                        added: 0,
                    });
                }
            }
            if to > body_start {
                delete_in(
                    &mut sec.body,
                    body_start,
                    from.max(body_start),
                    to.min(body_end),
                    splices,
                );
                if sec.body.is_empty() {
                    sec.body.push(Node::Block(Block::empty()));
                    splices.push(Splice {
                        at: to.min(body_end),
                        removed: 0,
                        added: 2,
                    });
                }
            }
            cur = end;
            i += 1;
        }
    }
}

/// Appends inline text to a section's title, addressed by id.
pub(crate) fn append_to_title(
    doc: &mut Document,
    id: SectionId,
    text: &str,
) -> Result<PositionMap, EngineError> {
    if text.is_empty() {
        return Ok(PositionMap::default());
    }
    let added = text.chars().count();
    match append_title_in(&mut doc.roots, 0, id, text) {
        Some(title_end) => Ok(PositionMap::single(Splice {
            at: title_end,
            removed: 0,
            added,
        })),
        None => Err(EngineError::SchemaRejection(format!(
            "unknown section {id:?}"
        ))),
    }
}

fn append_title_in(children: &mut [Node], base: usize, id: SectionId, text: &str) -> Option<usize> {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if let Node::Section(sec) = node {
            if sec.id == id {
                let title_end = cur + 1 + sec.title.len();
                sec.title.text.push_str(text);
                return Some(title_end);
            }
            let body_start = cur + sec.body_offset();
            if let Some(found) = append_title_in(&mut sec.body, body_start, id, text) {
                return Some(found);
            }
        }
        cur += sz;
    }
    None
}

/// True if the node list carries any section. Sections only nest inside
/// other sections, so checking the top level covers the whole forest.
pub(crate) fn contains_section(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| matches!(node, Node::Section(_)))
}
