//! Error type for checked operations and [`BTree::validate`](crate::BTree::validate).

use crate::{Key, MIN_ITEMS};

/// Result alias used by the checked operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`BTree`](crate::BTree).
///
/// The plain operations never fail. The `try_` variants report misuse of their preconditions,
/// and [`validate`](crate::BTree::validate) reports the first broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The key is reserved for internal use and cannot be stored.
    #[error("key {0} is reserved")]
    ReservedKey(Key),

    /// Next/prev was asked for a pivot that is not in the tree.
    #[error("pivot {0} is not present in the tree")]
    MissingPivot(Key),

    /// Keys within a node are not strictly ascending.
    #[error("node at depth {depth} holds unsorted keys")]
    Unsorted {
        /// Depth of the node, the root is at depth 0.
        depth: usize,
    },

    /// A non-leaf node does not have exactly one more child than items.
    #[error("node at depth {depth} has {items} items but {children} children")]
    ChildCount {
        /// Depth of the node.
        depth: usize,
        /// Number of items.
        items: usize,
        /// Number of children.
        children: usize,
    },

    /// A key lies outside the bounds set by the separators above it.
    #[error("key {key} at depth {depth} is outside its separator bounds")]
    OutOfBounds {
        /// The misplaced key.
        key: Key,
        /// Depth of the node holding it.
        depth: usize,
    },

    /// A leaf is not at the tree height, or a non-leaf is.
    #[error("node at depth {depth} does not agree with tree height {height}")]
    Height {
        /// Depth of the node.
        depth: usize,
        /// Recorded tree height.
        height: usize,
    },

    /// A non-root node has fewer than [`MIN_ITEMS`] items.
    #[error("node at depth {depth} has {items} items, minimum is {}", MIN_ITEMS)]
    Underflow {
        /// Depth of the node.
        depth: usize,
        /// Number of items.
        items: usize,
    },

    /// A node was left full.
    #[error("node at depth {depth} has {items} items and should have been split")]
    Overflow {
        /// Depth of the node.
        depth: usize,
        /// Number of items.
        items: usize,
    },

    /// The root is present but holds no items.
    #[error("root node is present but empty")]
    EmptyRoot,

    /// The maintained count differs from the number of reachable items.
    #[error("tree length is {tracked} but {found} items are reachable")]
    LengthMismatch {
        /// Count kept by the tree.
        tracked: usize,
        /// Count found by traversal.
        found: usize,
    },
}
