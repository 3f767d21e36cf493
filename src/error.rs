//! Error types for the B-tree index.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable errors reported by [`BTree`](crate::BTree).
///
/// None of these leave the tree modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The minimum degree must be at least 2.
    #[error("minimum degree must be at least 2, got {degree}")]
    InvalidDegree { degree: usize },

    /// Removal was attempted on a tree with no keys.
    #[error("cannot remove from an empty tree")]
    EmptyTree,

    /// Removal was attempted for a key the tree does not hold.
    #[error("key not found in tree")]
    KeyNotFound,
}

/// A broken structural invariant found by
/// [`BTree::check_invariants`](crate::BTree::check_invariants).
///
/// `depth` counts from 0 at the root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("keys are not strictly ascending in a node at depth {depth}")]
    UnsortedKeys { depth: usize },

    #[error("key at depth {depth} falls outside the range set by its parent separators")]
    SeparatorOrder { depth: usize },

    #[error("leaf at depth {depth} differs from leaf depth {expected}")]
    UnevenLeaves { depth: usize, expected: usize },

    #[error("node at depth {depth} holds {keys} keys, outside [{min}, {max}]")]
    KeyCount {
        depth: usize,
        keys: usize,
        min: usize,
        max: usize,
    },

    #[error("internal node at depth {depth} has {children} children for {keys} keys")]
    ChildCount {
        depth: usize,
        keys: usize,
        children: usize,
    },

    #[error("leaf node at depth {depth} has {children} children")]
    LeafWithChildren { depth: usize, children: usize },

    #[error("empty tree still holds a root node")]
    EmptyRoot,

    #[error("tree reports {recorded} keys but holds {actual}")]
    LengthMismatch { recorded: usize, actual: usize },
}
