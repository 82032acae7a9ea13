use log::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;

use super::inspect;
use super::level::{self, linearize_nodes};
use super::locate::HeadingMap;
use super::transaction::Transaction;
use super::tree::{self, Node};

/// What the normalizer did with a pasted fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardOutcome {
    /// No heading tokens in the fragment; the host performs its default
    /// (non-restructuring) insertion with the returned content.
    Unchanged(Vec<Node>),
    /// The fragment carried headings and was flattened and re-anchored into
    /// the staged document.
    Applied,
}

/// Normalizes a pasted fragment at `cursor`. Fragments without headings pass
/// through untouched; everything else is linearized into paragraph and
/// heading tokens, the paragraphs land at the cursor, and each heading is
/// re-anchored one at a time through the level transition engine with the
/// heading map updated between insertions.
pub(crate) fn normalize_clipboard(
    tx: &mut Transaction,
    config: &EngineConfig,
    fragment: Vec<Node>,
    cursor: usize,
) -> Result<ClipboardOutcome, EngineError> {
    if !tree::contains_section(&fragment) {
        return Ok(ClipboardOutcome::Unchanged(fragment));
    }
    if cursor > tx.doc().size() {
        return Err(EngineError::InvalidPositionRange {
            from: cursor,
            to: cursor,
        });
    }
    let fragment = if config.trim_paste_edges {
        trim_edges(fragment)
    } else {
        fragment
    };

    let (leading, tokens) = linearize_nodes(fragment);
    // Pasted sections get fresh ids; the copies never alias their source.
    let tokens: Vec<_> = tokens
        .into_iter()
        .map(|mut token| {
            token.id = None;
            token
        })
        .collect();
    debug!(
        "normalize_clipboard: {} leading block(s), {} heading token(s) at {cursor}",
        leading.len(),
        tokens.len()
    );

    // Text following the cursor inside its block moves past the pasted
    // headings. Cutting it first keeps every later insertion on a clean
    // node boundary.
    let mut tail = None;
    if let Some(cb) = inspect::block_at(tx.doc(), cursor) {
        let text_start = cb.start + 1;
        let text_end = text_start + cb.block.text.chars().count();
        if cursor > text_start && cursor < text_end {
            let off = cursor - text_start;
            let byte = tree::char_to_byte_idx(&cb.block.text, off);
            tail = Some(cb.block.text[byte..].to_string());
            tx.delete(cursor, text_end)?;
        }
    }

    let mut point = cursor;
    if !leading.is_empty() {
        let pmap = tx.insert(point, leading)?;
        if let Some(splice) = pmap.splices().first() {
            point = splice.at + splice.added;
        }
    }

    let first_level = tokens.first().map_or(1, |t| t.level);
    let scope = inspect::scope_start(tx.doc(), point, first_level);
    let mut map = HeadingMap::from_scan(tx.doc(), scope, point);
    let mut last_end = point;
    for token in tokens {
        let desc = level::insert_heading_token(tx, &mut map, token, point)?;
        last_end = desc.end;
    }

    if let Some(tail) = tail.filter(|t| !t.is_empty()) {
        tx.insert(last_end, vec![Node::paragraph(tail)])?;
    }
    Ok(ClipboardOutcome::Applied)
}

/// Drops empty blocks from both edges of the fragment.
fn trim_edges(mut fragment: Vec<Node>) -> Vec<Node> {
    while let Some(Node::Block(block)) = fragment.first() {
        if block.is_empty() {
            fragment.remove(0);
        } else {
            break;
        }
    }
    while let Some(Node::Block(block)) = fragment.last() {
        if block.is_empty() {
            fragment.pop();
        } else {
            break;
        }
    }
    fragment
}
