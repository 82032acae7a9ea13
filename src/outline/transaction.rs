use log::trace;

use crate::error::EngineError;

use super::tree::{self, Document, Node, SectionId};

/// Which side of an insertion boundary a mapped position sticks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// One contiguous replacement in old-document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Splice {
    pub at: usize,
    pub removed: usize,
    pub added: usize,
}

/// Remaps positions captured before a single insert/delete to their correct
/// values afterwards. Splices are kept in ascending old-coordinate order and
/// describe the whole edit at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionMap {
    splices: Vec<Splice>,
}

impl PositionMap {
    pub(crate) fn new(splices: Vec<Splice>) -> Self {
        Self { splices }
    }

    pub(crate) fn single(splice: Splice) -> Self {
        Self {
            splices: vec![splice],
        }
    }

    pub fn splices(&self) -> &[Splice] {
        &self.splices
    }

    /// Remap a position captured before the edit. Positions inside a removed
    /// span collapse to the start of that span; positions exactly at an
    /// insertion point follow `assoc`.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta: i64 = 0;
        for splice in &self.splices {
            if pos < splice.at {
                break;
            }
            if splice.removed > 0 && pos < splice.at + splice.removed {
                return (splice.at as i64 + delta) as usize;
            }
            if pos == splice.at && splice.removed == 0 {
                if assoc == Assoc::After {
                    delta += splice.added as i64;
                }
                break;
            }
            delta += splice.added as i64 - splice.removed as i64;
        }
        (pos as i64 + delta) as usize
    }
}

/// Composition of the position maps produced by a sequence of edits within
/// one logical operation.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    maps: Vec<PositionMap>,
}

impl Mapping {
    pub fn push(&mut self, map: PositionMap) {
        self.maps.push(map);
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |p, m| m.map(p, assoc))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

/// All edits of one operation, staged against a working copy of the
/// document. Nothing the host can observe changes until the session commits
/// the transaction; dropping it discards every staged edit.
pub(crate) struct Transaction {
    work: Document,
    mapping: Mapping,
}

impl Transaction {
    pub(crate) fn new(doc: &Document) -> Self {
        Self {
            work: doc.clone(),
            mapping: Mapping::default(),
        }
    }

    pub(crate) fn doc(&self) -> &Document {
        &self.work
    }

    pub(crate) fn allocate_id(&mut self) -> SectionId {
        self.work.allocate_id()
    }

    pub(crate) fn insert(
        &mut self,
        pos: usize,
        nodes: Vec<Node>,
    ) -> Result<PositionMap, EngineError> {
        trace!("stage insert of {} node(s) at {pos}", nodes.len());
        let map = tree::insert_nodes(&mut self.work, pos, nodes)?;
        self.mapping.push(map.clone());
        Ok(map)
    }

    pub(crate) fn insert_text(
        &mut self,
        pos: usize,
        text: &str,
    ) -> Result<PositionMap, EngineError> {
        trace!("stage text insert at {pos}");
        let map = tree::insert_text(&mut self.work, pos, text)?;
        self.mapping.push(map.clone());
        Ok(map)
    }

    pub(crate) fn delete(&mut self, from: usize, to: usize) -> Result<PositionMap, EngineError> {
        trace!("stage delete of {from}..{to}");
        let map = tree::delete_span(&mut self.work, from, to)?;
        self.mapping.push(map.clone());
        Ok(map)
    }

    pub(crate) fn append_title(
        &mut self,
        id: SectionId,
        text: &str,
    ) -> Result<PositionMap, EngineError> {
        trace!("stage title append on {id:?}");
        let map = tree::append_to_title(&mut self.work, id, text)?;
        self.mapping.push(map.clone());
        Ok(map)
    }

    /// Consumes the transaction into the edited document and the composed
    /// mapping of every staged edit, in order. The session hands the mapping
    /// to the host so positions captured before the operation can be
    /// remapped.
    pub(crate) fn into_parts(self) -> (Document, Mapping) {
        (self.work, self.mapping)
    }
}
