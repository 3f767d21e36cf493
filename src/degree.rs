use crate::error::{Error, Result};

// https://en.wikipedia.org/wiki/B-tree
// This uses the CLRS definition of a B-tree in terms of its minimum degree t:
// A root node: min 0 (empty tree) max 2t-1 keys
// Any other node: min t-1 max 2t-1 keys
// An internal node: one more child than it has keys, so between t and 2t children
// t = 2 is the smallest valid tree (a 2-3-4 tree)

/// Minimum degree `t` of a [`BTree`](crate::BTree).
///
/// Guaranteed to be at least 2 once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinDegree(usize);

impl MinDegree {
    /// Smallest minimum degree a B-tree can have.
    pub const MIN: usize = 2;

    /// Validates `t` as a minimum degree.
    ///
    /// Returns [`Error::InvalidDegree`] if `t < 2`.
    pub fn new(t: usize) -> Result<Self> {
        if t < Self::MIN {
            return Err(Error::InvalidDegree { degree: t });
        }
        Ok(MinDegree(t))
    }

    /// The raw value of `t`.
    pub fn get(self) -> usize {
        self.0
    }

    /// Fewest keys a non-root node may hold (`t - 1`).
    pub fn min_keys(self) -> usize {
        self.0 - 1
    }

    /// Most keys any node may hold (`2t - 1`).
    pub fn max_keys(self) -> usize {
        2 * self.0 - 1
    }

    /// Most children an internal node may hold (`2t`).
    pub fn max_children(self) -> usize {
        2 * self.0
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        MinDegree(Self::MIN)
    }
}

impl TryFrom<usize> for MinDegree {
    type Error = Error;

    fn try_from(t: usize) -> Result<Self> {
        MinDegree::new(t)
    }
}
