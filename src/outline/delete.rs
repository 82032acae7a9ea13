use log::debug;

use crate::error::EngineError;

use super::inspect::{self, SectionCtx};
use super::level::{self, linearize_nodes};
use super::locate::HeadingMap;
use super::transaction::Transaction;
use super::tree::{self, Block, Node};

/// Deletes `from..to` across block and section boundaries. Returns false
/// for the selections the host handles with its default block-local delete:
/// empty and single-block ranges, and the whole-document selection, which
/// never restructures.
pub(crate) fn delete_range(tx: &mut Transaction, from: usize, to: usize) -> Result<bool, EngineError> {
    let size = tx.doc().size();
    if from > to || to > size {
        return Err(EngineError::InvalidPositionRange { from, to });
    }
    if from == to {
        return Ok(false);
    }
    if from == 0 && to == size {
        debug!("delete_range: whole-document selection, deferring");
        return Ok(false);
    }
    if let Some(cb) = inspect::block_at(tx.doc(), from) {
        if to <= cb.end {
            return Ok(false);
        }
    }
    // The outermost section around the selection end whose header dies with
    // the selection. Everything trailing the end inside it is orphaned and
    // must be re-anchored after the delete.
    let dying = inspect::enclosing_chain(tx.doc(), to)
        .into_iter()
        .find(|ctx| ctx.start >= from);
    match dying {
        Some(d) => delete_with_orphans(tx, from, to, d),
        None => simple_delete(tx, from, to),
    }
}

/// No section header dies at the selection end: delete the range and join
/// the end block's trailing text onto the selection start.
fn simple_delete(tx: &mut Transaction, from: usize, to: usize) -> Result<bool, EngineError> {
    let mut tail = None;
    if let Some(cb) = inspect::block_at(tx.doc(), to) {
        if to > cb.start {
            let off = (to - cb.start - 1).min(cb.block.text.chars().count());
            let byte = tree::char_to_byte_idx(&cb.block.text, off);
            tail = Some((cb.block.kind, cb.block.text[byte..].to_string(), cb.end));
        }
    }
    match tail {
        Some((kind, text, end)) => {
            tx.delete(from, end)?;
            if !text.is_empty() {
                if inspect::is_text_position(tx.doc(), from) {
                    tx.insert_text(from, &text)?;
                } else {
                    tx.insert(from, vec![Node::Block(Block { kind, text })])?;
                }
            }
        }
        None => {
            tx.delete(from, to)?;
        }
    }
    Ok(true)
}

fn delete_with_orphans(
    tx: &mut Transaction,
    from: usize,
    to: usize,
    d: SectionCtx,
) -> Result<bool, EngineError> {
    let Some(dsec) = inspect::section_ref(tx.doc(), d.id).cloned() else {
        return Ok(false);
    };
    debug!(
        "delete_range: {from}..{to} kills section {:?} spanning {}..{}",
        d.id, d.start, d.end
    );
    let body_start = d.start + dsec.body_offset();
    let mut survivors = Vec::new();
    if to > d.start && to < body_start {
        let byte = tree::char_to_byte_idx(&dsec.title.text, to - d.start - 1);
        let title_tail = &dsec.title.text[byte..];
        if !title_tail.is_empty() {
            survivors.push(Node::Block(Block::paragraph(title_tail)));
        }
    }
    collect_after(&dsec.body, body_start, to, &mut survivors);
    let (mut leftover, orphans) = linearize_nodes(survivors);

    // The dying section's whole span goes; survivors come back below.
    tx.delete(from, d.end)?;

    let mut point = from;
    if let Some(Node::Block(first)) = leftover.first() {
        if inspect::is_text_position(tx.doc(), from) {
            let text = first.text.clone();
            let joined = text.chars().count();
            tx.insert_text(from, &text)?;
            leftover.remove(0);
            point = from + joined;
        }
    }
    if !leftover.is_empty() {
        let pmap = tx.insert(point, leftover)?;
        if let Some(splice) = pmap.splices().first() {
            point = splice.at + splice.added;
        }
    }

    if let Some(first) = orphans.first() {
        let scope = inspect::scope_start(tx.doc(), point, first.level);
        let mut map = HeadingMap::from_scan(tx.doc(), scope, point);
        for token in orphans {
            level::insert_heading_token(tx, &mut map, token, point)?;
        }
    }
    Ok(true)
}

/// Clones everything after `to` out of a dying subtree: whole nodes past the
/// cut, tail text of the block or title the cut lands in, and the surviving
/// content of sections whose headers die.
fn collect_after(children: &[Node], base: usize, to: usize, out: &mut Vec<Node>) {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        let end = cur + sz;
        if end <= to {
            cur = end;
            continue;
        }
        if cur >= to {
            out.push(node.clone());
            cur = end;
            continue;
        }
        match node {
            Node::Block(block) => {
                let off = (to - cur - 1).min(block.text.chars().count());
                let byte = tree::char_to_byte_idx(&block.text, off);
                let tail = &block.text[byte..];
                if !tail.is_empty() {
                    out.push(Node::Block(Block {
                        kind: block.kind,
                        text: tail.to_string(),
                    }));
                }
            }
            Node::Section(sec) => {
                let body_start = cur + sec.body_offset();
                if to < body_start {
                    let byte = tree::char_to_byte_idx(&sec.title.text, to - cur - 1);
                    let tail = &sec.title.text[byte..];
                    if !tail.is_empty() {
                        out.push(Node::Block(Block::paragraph(tail)));
                    }
                }
                collect_after(&sec.body, body_start, to, out);
            }
        }
        cur = end;
    }
}

/// Backspace at offset 0 of a section body's first block merges the block
/// into the title. Returns the new caret position, or `None` when the host
/// should run its default block-local behavior instead.
pub(crate) fn backspace(tx: &mut Transaction, pos: usize) -> Result<Option<usize>, EngineError> {
    if pos == 0 || pos > tx.doc().size() {
        return Ok(None);
    }
    let Some(ctx) = inspect::enclosing_chain(tx.doc(), pos).pop() else {
        return Ok(None);
    };
    let Some(sec) = inspect::section_ref(tx.doc(), ctx.id).cloned() else {
        return Ok(None);
    };
    let body_start = ctx.start + sec.body_offset();
    if pos != body_start + 1 {
        return Ok(None);
    }
    let Some(Node::Block(first)) = sec.body.first() else {
        return Ok(None);
    };
    let title_len = sec.title.len();
    if title_len == 0 && sec.body.len() > 1 {
        return Ok(None);
    }
    let caret = ctx.start + 1 + title_len;
    tx.append_title(ctx.id, &first.text)?;
    // The block shifted right by the characters the title just absorbed.
    let start = body_start + first.text.chars().count();
    tx.delete(start, start + first.size())?;
    Ok(Some(caret))
}
