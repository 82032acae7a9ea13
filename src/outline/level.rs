use log::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;

use super::inspect;
use super::locate::{HeadingDescriptor, HeadingMap};
use super::transaction::Transaction;
use super::tree::{Block, InlineContent, Node, Section, SectionId};

/// A heading reduced to its flat form: level, title and a body of plain
/// blocks only. Produced by linearization and consumed by re-insertion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeadingToken {
    pub id: Option<SectionId>,
    pub level: u8,
    pub title: String,
    pub body: Vec<Node>,
}

/// Flattens a node list into a leading run of plain blocks and an ordered
/// list of heading tokens. Blocks following a token attach to that token's
/// body; nested section bodies are flattened back into the stream until no
/// token carries structural content.
pub(crate) fn linearize_nodes(nodes: Vec<Node>) -> (Vec<Node>, Vec<HeadingToken>) {
    let mut leading = Vec::new();
    let mut tokens = Vec::new();
    flatten_into(nodes, &mut leading, &mut tokens);
    (leading, tokens)
}

fn flatten_into(nodes: Vec<Node>, leading: &mut Vec<Node>, tokens: &mut Vec<HeadingToken>) {
    for node in nodes {
        match node {
            Node::Block(block) => match tokens.last_mut() {
                Some(token) => token.body.push(Node::Block(block)),
                None => leading.push(Node::Block(block)),
            },
            Node::Section(sec) => {
                tokens.push(HeadingToken {
                    id: Some(sec.id),
                    level: sec.level,
                    title: sec.title.text,
                    body: Vec::new(),
                });
                flatten_into(sec.body, leading, tokens);
            }
        }
    }
}

/// Anchor search for a heading at `level`: the last entry in document order
/// whose level does not exceed `level`, or the first entry when every one
/// does. `nested` means the anchor's level is strictly smaller, so the new
/// heading descends into its body instead of following it as a sibling.
///
/// Levels in the map are ordered by position, not by value, so this is a
/// linear scan rather than a numeric search.
pub(crate) fn find_prev_block(
    entries: &[HeadingDescriptor],
    level: u8,
) -> (Option<&HeadingDescriptor>, bool) {
    let Some(first) = entries.first() else {
        return (None, false);
    };
    match entries.iter().rev().find(|e| e.level <= level) {
        Some(prev) => (Some(prev), prev.level < level),
        None => (Some(first), first.level < level),
    }
}

/// Position a new heading lands at relative to its anchor: the end of the
/// anchor's body when nesting, the boundary after its whole subtree when
/// following as a sibling.
pub(crate) fn insertion_point(prev: &HeadingDescriptor, nested: bool) -> usize {
    if nested { prev.end - 1 } else { prev.end }
}

/// Materializes a token back into a section, allocating an id for tokens
/// that do not carry one. An empty body defaults to one empty paragraph.
pub(crate) fn token_into_section(tx: &mut Transaction, token: HeadingToken) -> Section {
    let id = token.id.unwrap_or_else(|| tx.allocate_id());
    let mut body = token.body;
    if body.is_empty() {
        body.push(Node::Block(Block::empty()));
    }
    Section {
        id,
        level: token.level,
        title: InlineContent::new(token.title),
        body,
    }
}

/// Resolves the insertion point and depth for a heading at `level` against
/// `map`. An empty map carries no heading to anchor on and reports
/// `MissingHeadingContext`; callers recover with a position of their own.
pub(crate) fn find_anchor(map: &HeadingMap, level: u8) -> Result<(usize, usize), EngineError> {
    let (prev, nested) = find_prev_block(map.entries(), level);
    let Some(prev) = prev else {
        return Err(EngineError::MissingHeadingContext);
    };
    Ok((insertion_point(prev, nested), prev.depth + usize::from(nested)))
}

/// Inserts one heading token at the anchor `find_anchor` selects from
/// `map`, falling back to `fallback` when no anchor exists. The map is
/// updated in place with the resulting shift and the new descriptor, so a
/// caller inserting a run of tokens never re-walks the tree.
pub(crate) fn insert_heading_token(
    tx: &mut Transaction,
    map: &mut HeadingMap,
    token: HeadingToken,
    fallback: usize,
) -> Result<HeadingDescriptor, EngineError> {
    let (point, depth) = match find_anchor(map, token.level) {
        Ok(anchor) => anchor,
        Err(EngineError::MissingHeadingContext) => (fallback, 0),
        Err(err) => return Err(err),
    };
    let level = token.level;
    let sec = token_into_section(tx, token);
    let total = sec.size();
    let pmap = tx.insert(point, vec![Node::Section(sec)])?;
    map.remap(&pmap);
    // A split insert shifts the section one past the splice origin.
    let start = match pmap.splices().first() {
        Some(splice) if splice.added != total => splice.at + 1,
        Some(splice) => splice.at,
        None => point,
    };
    let desc = HeadingDescriptor {
        level,
        start,
        end: start + total,
        depth,
    };
    map.insert(desc);
    Ok(desc)
}

/// Moves the section carrying `id` to `new_level`. The subtree is cut,
/// linearized, and re-anchored token by token: the head token through a
/// heading map over the enclosing window, each descendant token through a
/// map scoped to the freshly re-inserted subtree.
pub(crate) fn change_level(
    tx: &mut Transaction,
    config: &EngineConfig,
    id: SectionId,
    new_level: u8,
) -> Result<bool, EngineError> {
    if new_level == 0 || new_level > config.max_level {
        return Err(EngineError::SchemaRejection(format!(
            "section level {new_level} outside 1..={}",
            config.max_level
        )));
    }
    let Some(ctx) = inspect::section_span(tx.doc(), id) else {
        debug!("change_level: no section with {id:?}");
        return Ok(false);
    };
    if ctx.level == new_level {
        return Ok(true);
    }
    let Some(sec) = inspect::section_ref(tx.doc(), id).cloned() else {
        return Ok(false);
    };
    debug!(
        "change_level: {id:?} {} -> {new_level} at {}..{}",
        ctx.level, ctx.start, ctx.end
    );

    tx.delete(ctx.start, ctx.end)?;
    let (_, tokens) = linearize_nodes(vec![Node::Section(sec)]);
    let mut tokens = tokens.into_iter();
    let Some(mut head) = tokens.next() else {
        return Ok(false);
    };
    head.level = new_level;

    let point = ctx.start;
    let scope = inspect::scope_start(tx.doc(), point, new_level);
    let mut map = HeadingMap::from_scan(tx.doc(), scope, point);
    let head_desc = insert_heading_token(tx, &mut map, head, point)?;

    // Descendants re-anchor against the moved subtree only, not the outer
    // window, so their relative nesting is rebuilt from scratch.
    let mut sub_map = HeadingMap::default();
    sub_map.insert(head_desc);
    for token in tokens {
        insert_heading_token(tx, &mut sub_map, token, head_desc.end)?;
    }
    Ok(true)
}

/// Wraps the blocks covered by `from..to` into a new section at `level`.
/// The first covered block becomes the title, the rest the body; an empty
/// selection produces an empty section at the caret.
pub(crate) fn wrap_selection(
    tx: &mut Transaction,
    config: &EngineConfig,
    from: usize,
    to: usize,
    level: u8,
) -> Result<bool, EngineError> {
    if level == 0 || level > config.max_level {
        return Err(EngineError::SchemaRejection(format!(
            "section level {level} outside 1..={}",
            config.max_level
        )));
    }
    if from > to || to > tx.doc().size() {
        return Err(EngineError::InvalidPositionRange { from, to });
    }
    let covered = if from == to {
        Vec::new()
    } else {
        inspect::covered_blocks(tx.doc(), from, to)
    };
    let (point, token) = if covered.is_empty() {
        (
            from,
            HeadingToken {
                id: None,
                level,
                title: String::new(),
                body: Vec::new(),
            },
        )
    } else {
        let aligned_from = covered[0].start;
        let aligned_to = covered[covered.len() - 1].end;
        let title = covered[0].block.text.clone();
        let body = covered[1..]
            .iter()
            .map(|c| Node::Block(c.block.clone()))
            .collect();
        tx.delete(aligned_from, aligned_to)?;
        (
            aligned_from,
            HeadingToken {
                id: None,
                level,
                title,
                body,
            },
        )
    };
    let scope = inspect::scope_start(tx.doc(), point, level);
    let mut map = HeadingMap::from_scan(tx.doc(), scope, point);
    insert_heading_token(tx, &mut map, token, point)?;
    Ok(true)
}
