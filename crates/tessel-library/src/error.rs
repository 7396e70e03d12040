//! Library errors.

use thiserror::Error;
use tessel_core::NodeError;

/// Failures at the library boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// No registered library provides a node with this id.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// A node index past the end of a library.
    #[error("node index {index} out of range for library '{library}' with {count} nodes")]
    IndexOutOfRange {
        /// Name of the library.
        library: String,
        /// Requested index.
        index: usize,
        /// Number of nodes in the library.
        count: usize,
    },

    /// A configuration fault raised by the node runtime.
    #[error(transparent)]
    Node(#[from] NodeError),
}
