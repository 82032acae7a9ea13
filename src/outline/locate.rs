use super::transaction::{Assoc, PositionMap};
use super::tree::{Document, Node};

/// Transient view of one heading inside a search window. Never persisted;
/// spans are only valid against the snapshot (or map-updated state) they
/// were computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingDescriptor {
    pub level: u8,
    pub start: usize,
    pub end: usize,
    pub depth: usize,
}

/// All headings whose start falls inside `start..end`, in document order.
/// Pure and read-only.
pub(crate) fn locate(doc: &Document, start: usize, end: usize) -> Vec<HeadingDescriptor> {
    let mut out = Vec::new();
    locate_in(&doc.roots, 0, 0, start, end, &mut out);
    out
}

fn locate_in(
    children: &[Node],
    base: usize,
    depth: usize,
    start: usize,
    end: usize,
    out: &mut Vec<HeadingDescriptor>,
) {
    let mut cur = base;
    for node in children {
        let sz = node.size();
        if let Node::Section(sec) = node {
            if cur >= start && cur < end {
                out.push(HeadingDescriptor {
                    level: sec.level,
                    start: cur,
                    end: cur + sz,
                    depth,
                });
            }
            if cur + sz > start && cur < end {
                locate_in(&sec.body, cur + sec.body_offset(), depth + 1, start, end, out);
            }
        }
        cur += sz;
    }
}

/// Keeps only the headings visible at the current nesting context: a
/// descriptor survives if its depth does not exceed the minimum depth seen
/// so far in the scan.
pub(crate) fn filter_visible(entries: &[HeadingDescriptor]) -> Vec<HeadingDescriptor> {
    let mut min_depth = usize::MAX;
    let mut out = Vec::new();
    for entry in entries {
        if entry.depth <= min_depth {
            out.push(*entry);
            min_depth = entry.depth;
        }
    }
    out
}

/// Ordered heading index over a search window. Maintained incrementally
/// through the edits of one operation instead of re-walking the tree after
/// every sub-insertion.
#[derive(Clone, Debug, Default)]
pub(crate) struct HeadingMap {
    entries: Vec<HeadingDescriptor>,
}

impl HeadingMap {
    pub(crate) fn from_scan(doc: &Document, start: usize, end: usize) -> Self {
        Self {
            entries: locate(doc, start, end),
        }
    }

    pub(crate) fn entries(&self) -> &[HeadingDescriptor] {
        &self.entries
    }

    /// Shifts every span through the map of an edit that just happened.
    /// Starts bias forward so an insertion at a heading's open token pushes
    /// it; ends bias backward so an insertion exactly at a heading's close
    /// boundary stays outside it.
    pub(crate) fn remap(&mut self, map: &PositionMap) {
        for entry in &mut self.entries {
            entry.start = map.map(entry.start, Assoc::After);
            entry.end = map.map(entry.end, Assoc::Before);
        }
    }

    /// Records a freshly inserted heading, keeping document order.
    pub(crate) fn insert(&mut self, desc: HeadingDescriptor) {
        let idx = self.entries.partition_point(|e| e.start <= desc.start);
        self.entries.insert(idx, desc);
    }
}
