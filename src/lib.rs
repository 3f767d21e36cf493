//! An in-memory ordered set backed by a B-tree of configurable minimum degree.
//!
//! Every node other than the root holds between `t - 1` and `2t - 1` keys, all leaves sit at
//! the same depth, and each mutation repairs the tree in a single top-down pass: full
//! children are split before insertion descends into them, and minimal children are topped
//! up (by borrowing from a sibling or merging with one) before deletion descends into them.
//!
//! # Example
//! ```
//! use btree_index::{BTree, Error};
//!
//! let mut tree = BTree::new(3)?;
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.traverse(), vec![&5, &6, &7, &10, &12, &17, &20, &30]);
//!
//! assert_eq!(tree.remove(&6), Ok(6));
//! assert_eq!(tree.remove(&6), Err(Error::KeyNotFound));
//! assert!(tree.check_invariants().is_ok());
//! # Ok::<(), Error>(())
//! ```

pub mod b_tree;
pub mod degree;
pub mod error;

pub use b_tree::{BTree, IntoIter, Iter};
pub use degree::MinDegree;
pub use error::{Error, Result, Violation};
