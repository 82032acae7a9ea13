use thiserror::Error;

/// Failures raised by the restructuring engine. Every variant is fatal to the
/// single operation that raised it: the staged transaction is discarded and
/// the externally visible tree is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `from > to`, or a position outside the document.
    #[error("invalid position range {from}..{to}")]
    InvalidPositionRange { from: usize, to: usize },

    /// The heading map for the operation's window holds no anchor. Callers
    /// recover locally by inserting at a fallback position of their own.
    #[error("no enclosing heading context")]
    MissingHeadingContext,

    /// A constructed node violates the structural invariants (for example a
    /// section level outside the configured range).
    #[error("schema rejection: {0}")]
    SchemaRejection(String),

    /// A second operation was started while another one was still applying.
    #[error("editing session is already applying an operation")]
    ReentrantOperation,
}
