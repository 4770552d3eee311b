use thiserror::Error;

use crate::handle::Handle;

/// Errors surfaced by the decomposition manager and the net-graph view.
///
/// Conditions that are part of normal operation (a chain with no neighbor,
/// a snarl with no children) are represented by empty results, never by a
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnarlError {
    /// A snarl was passed by value whose boundary key is unknown to the
    /// manager that was asked about it.
    #[error("snarl {start}-{end} is not owned by this manager")]
    Misowned { start: Handle, end: Handle },

    /// Visit expansion read into a child snarl through a node that is
    /// neither of the child's boundaries.
    #[error("read into child {start}-{end} with non-matching traversal")]
    InvariantViolation { start: Handle, end: Handle },

    /// The requested operation is not available on this graph view.
    #[error("cannot expose {0} via the net graph")]
    Unsupported(&'static str),
}
