use log::warn;

use crate::config::EngineConfig;
use crate::error::EngineError;

mod tree;
mod inspect;
mod transaction;
mod locate;
mod level;
mod clipboard;
mod delete;
pub mod schema;

pub use clipboard::ClipboardOutcome;
pub use inspect::Resolved;
pub use locate::HeadingDescriptor;
pub use transaction::{Assoc, Mapping, PositionMap, Splice};
pub use tree::{Block, BlockKind, Document, InlineContent, Node, Section, SectionId};

use transaction::Transaction;

/// The session is either waiting for the next user action or in the middle
/// of applying one. Operations arriving while one is applying are rejected,
/// never interleaved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Idle,
    Applying,
}

/// An editing session owning one outline document. All restructuring goes
/// through it: each public operation stages its edits on a working copy and
/// the session swaps the document in only when the whole operation
/// succeeded, so a failure never leaves a half-applied tree behind.
pub struct OutlineEditor {
    doc: Document,
    config: EngineConfig,
    state: SessionState,
    last_mapping: Mapping,
}

impl OutlineEditor {
    pub fn new(doc: Document) -> Self {
        Self::with_config(doc, EngineConfig::default())
    }

    pub fn with_config(mut doc: Document, config: EngineConfig) -> Self {
        doc.ensure_initialized();
        Self {
            doc,
            config,
            state: SessionState::Idle,
            last_mapping: Mapping::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The composed position map of the last committed operation. Hosts
    /// remap carets and selections captured before the call through it.
    /// Identity (empty) when the last attempt changed nothing.
    pub fn last_mapping(&self) -> &Mapping {
        &self.last_mapping
    }

    // ------------------------------------------------------------------
    // Restructuring operations
    // ------------------------------------------------------------------

    /// Moves the section carrying `id` to `new_level`, re-anchoring it and
    /// its descendant headings. Changing a section to its current level is
    /// a no-op that still reports success.
    pub fn change_level(&mut self, id: SectionId, new_level: u8) -> bool {
        self.apply(|tx, config| level::change_level(tx, config, id, new_level))
    }

    /// Wraps the blocks covered by `from..to` into a new section at
    /// `level`, anchored like any other heading insertion.
    pub fn wrap_selection_as_heading(&mut self, from: usize, to: usize, level: u8) -> bool {
        self.apply(|tx, config| level::wrap_selection(tx, config, from, to, level))
    }

    /// Deletes `from..to` across section boundaries, merging leftover
    /// content at the start and re-anchoring orphaned headings. Returns
    /// false for the selections the host's default delete should handle.
    pub fn delete_range(&mut self, from: usize, to: usize) -> bool {
        self.apply(|tx, _| delete::delete_range(tx, from, to))
    }

    /// Backspace at `pos`. `Some(caret)` when the engine merged a body
    /// block into its section title; `None` defers to the host's default
    /// block-local behavior (including at the very start of the document).
    pub fn backspace(&mut self, pos: usize) -> Option<usize> {
        if !self.enter() {
            return None;
        }
        self.last_mapping = Mapping::default();
        let mut tx = Transaction::new(&self.doc);
        let out = match delete::backspace(&mut tx, pos) {
            Ok(Some(caret)) => {
                (self.doc, self.last_mapping) = tx.into_parts();
                Some(caret)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("backspace aborted: {err}");
                None
            }
        };
        self.state = SessionState::Idle;
        out
    }

    /// Normalizes a pasted fragment at `cursor`. A fragment without heading
    /// tokens is handed back unchanged for the host's default insertion;
    /// otherwise the engine flattens and re-anchors it into the document.
    /// On failure the fragment is handed back and the document is left
    /// untouched.
    pub fn normalize_clipboard(&mut self, fragment: Vec<Node>, cursor: usize) -> ClipboardOutcome {
        if !tree::contains_section(&fragment) {
            return ClipboardOutcome::Unchanged(fragment);
        }
        if !self.enter() {
            return ClipboardOutcome::Unchanged(fragment);
        }
        self.last_mapping = Mapping::default();
        let mut tx = Transaction::new(&self.doc);
        let out = match clipboard::normalize_clipboard(&mut tx, &self.config, fragment.clone(), cursor)
        {
            Ok(ClipboardOutcome::Applied) => {
                (self.doc, self.last_mapping) = tx.into_parts();
                ClipboardOutcome::Applied
            }
            Ok(unchanged) => unchanged,
            Err(err) => {
                warn!("clipboard normalization aborted: {err}");
                ClipboardOutcome::Unchanged(fragment)
            }
        };
        self.state = SessionState::Idle;
        out
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    /// The deepest node whose span contains `pos`.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        inspect::node_at(&self.doc, pos)
    }

    /// Resolves `pos` into its enclosing section path and local offset.
    pub fn resolve(&self, pos: usize) -> Option<Resolved> {
        inspect::resolve(&self.doc, pos)
    }

    /// All headings starting inside `start..end`, in document order.
    pub fn headings(&self, start: usize, end: usize) -> Vec<HeadingDescriptor> {
        locate::locate(&self.doc, start, end)
    }

    /// The headings of `start..end` visible at the current nesting context:
    /// entries nested deeper than an already-seen sibling are dropped.
    pub fn visible_headings(&self, start: usize, end: usize) -> Vec<HeadingDescriptor> {
        locate::filter_visible(&locate::locate(&self.doc, start, end))
    }

    // ------------------------------------------------------------------
    // Session plumbing
    // ------------------------------------------------------------------

    fn enter(&mut self) -> bool {
        if self.state == SessionState::Applying {
            warn!("{}", EngineError::ReentrantOperation);
            return false;
        }
        self.state = SessionState::Applying;
        true
    }

    fn apply<F>(&mut self, op: F) -> bool
    where
        F: FnOnce(&mut Transaction, &EngineConfig) -> Result<bool, EngineError>,
    {
        if !self.enter() {
            return false;
        }
        self.last_mapping = Mapping::default();
        let mut tx = Transaction::new(&self.doc);
        let out = match op(&mut tx, &self.config) {
            Ok(true) => {
                (self.doc, self.last_mapping) = tx.into_parts();
                true
            }
            Ok(false) => false,
            Err(err) => {
                warn!("operation aborted, document unchanged: {err}");
                false
            }
        };
        self.state = SessionState::Idle;
        out
    }
}

#[cfg(test)]
#[path = "outline_tests.rs"]
mod outline_tests;

#[cfg(test)]
#[path = "outline/tree_tests.rs"]
mod tree_tests;

#[cfg(test)]
#[path = "outline/level_tests.rs"]
mod level_tests;


#[cfg(test)]
#[path = "outline/delete_tests.rs"]
mod delete_tests;
