//! Heading-restructuring engine for nested, foldable outline documents.
//!
//! The crate owns the tree-editing algorithms of an outline editor: level
//! changes (promote/demote), wrapping selections into headings, clipboard
//! normalization of mixed flat/nested fragments, and range deletion with
//! orphaned-heading re-anchoring. Sync transport, persistence and rendering
//! live in the host; they talk to this engine through [`OutlineEditor`].

pub mod config;
pub mod error;
pub mod outline;

pub use config::{EngineConfig, MAX_LEVEL};
pub use error::EngineError;
pub use outline::{
    Assoc, Block, BlockKind, ClipboardOutcome, Document, HeadingDescriptor, InlineContent,
    Mapping, Node, OutlineEditor, PositionMap, Resolved, Section, SectionId, Splice,
};
