use std::fmt;

use log::debug;

use crate::degree::MinDegree;
use crate::error::{Error, Result};

mod check;
mod iter;
mod node;

pub use iter::{IntoIter, Iter};
use node::Node;

// https://en.wikipedia.org/wiki/B-tree
// The tree owns its root, every other node is owned by its parent. There are no parent
// pointers: each operation is one top-down pass in which a node only rewrites its own
// keys and children.

/// An ordered set of keys stored in a B-tree of configurable minimum degree.
pub struct BTree<T> {
    root: Option<Box<Node<T>>>,
    degree: MinDegree,
    len: usize,
}

impl<T> BTree<T> {
    /// Constructor method for BTree
    ///
    /// Takes in a usize parameter t representing the minimum degree of the BTree: every
    /// node other than the root holds between t-1 and 2t-1 keys
    ///
    /// Returns [`Error::InvalidDegree`] if t is less than 2
    pub fn new(t: usize) -> Result<Self> {
        Ok(Self::with_degree(MinDegree::new(t)?))
    }

    /// Creates an empty tree from an already validated minimum degree
    pub fn with_degree(degree: MinDegree) -> Self {
        BTree {
            root: None,
            degree,
            len: 0,
        }
    }

    pub fn degree(&self) -> MinDegree {
        self.degree
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels in the tree (0 when empty, 1 when the root is a leaf)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            height += 1;
            node = n.children.first().map(|c| c.as_ref());
        }
        height
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.node_count())
    }

    /// Smallest key in the tree
    pub fn first(&self) -> Option<&T> {
        self.root.as_ref().and_then(|r| r.leftmost())
    }

    /// Largest key in the tree
    pub fn last(&self) -> Option<&T> {
        self.root.as_ref().and_then(|r| r.rightmost())
    }

    /// Traverse method for BTree
    ///
    /// Collects all keys for all nodes in order
    pub fn traverse(&self) -> Vec<&T> {
        let mut keys = Vec::with_capacity(self.len);
        if let Some(r) = &self.root {
            r.traverse(&mut keys);
        }
        keys
    }

    /// Lazy in-order iterator over the keys
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Removes every key, keeping the configured degree
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl<T: Ord> BTree<T> {
    /// Returns a reference to the key equal to `value`, if present
    pub fn get(&self, value: &T) -> Option<&T> {
        let mut node = self.root.as_deref()?;

        // Call search iteratively on each node
        loop {
            let (found, idx) = node.search(value);
            if found {
                return Some(&node.keys[idx]);
            }
            if node.leaf {
                return None;
            }
            node = &node.children[idx];
        }
    }

    /// Returns true if value is present, false otherwise
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Inserts a value into the b-tree
    ///
    /// Returns true if the value was added, false if an equal key was already present
    pub fn insert(&mut self, value: T) -> bool {
        let inserted = match self.root.take() {
            None => {
                // If root is empty, create a new root leaf node holding value
                debug!("inserting first key, creating leaf root");
                self.root = Some(Box::new(Node::with_key(self.degree, value)));
                true
            }
            Some(old_root) if old_root.is_full() => {
                // Root is full: make a new root over the old one, split the old root,
                // and insert below the new root
                let mut new_root = Node::new_internal(self.degree, vec![old_root]);
                new_root.split_child(0);
                let inserted = new_root.insert_non_full(value);
                self.root = Some(Box::new(new_root));
                debug!("root split, tree height is now {}", self.height());
                inserted
            }
            Some(mut root) => {
                let inserted = root.insert_non_full(value);
                self.root = Some(root);
                inserted
            }
        };

        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Inserts every value yielded by `values`, returning how many were new
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        let mut added = 0;
        for value in values {
            if self.insert(value) {
                added += 1;
            }
        }
        added
    }
}

impl<T: Ord + Clone> BTree<T> {
    /// Deletes a value from the b-tree, returning the removed key
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys and [`Error::KeyNotFound`] if
    /// the value is absent. In both cases the set of keys is unchanged.
    pub fn remove(&mut self, value: &T) -> Result<T> {
        let Some(root) = self.root.as_mut() else {
            debug!("remove called on an empty tree");
            return Err(Error::EmptyTree);
        };

        let removed = root.remove(value);

        // Shrink the tree if the root ran out of keys (repairs on the way down can empty
        // the root even when the key was missing)
        if root.keys.is_empty() {
            if root.leaf {
                debug!("last key removed, tree is now empty");
                self.root = None;
            } else {
                self.root = self.root.take().and_then(|mut old_root| old_root.children.pop());
                debug!("root demoted, tree height is now {}", self.height());
            }
        }

        match removed {
            Some(key) => {
                self.len -= 1;
                Ok(key)
            }
            None => {
                debug!("key not found, nothing removed");
                Err(Error::KeyNotFound)
            }
        }
    }
}

impl<T> Default for BTree<T> {
    fn default() -> Self {
        Self::with_degree(MinDegree::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Prints the b-tree structure, one node per line indented by depth
impl<T: fmt::Debug> fmt::Display for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(r) => {
                writeln!(f, "=== BTree Structure (t = {}) ===", self.degree.get())?;
                r.fmt_structure(f, 0)
            }
            None => writeln!(f, "=== EMPTY BTREE ==="),
        }
    }
}

impl<'a, T> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> IntoIterator for BTree<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.len)
    }
}

impl<T: Ord> FromIterator<T> for BTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BTree::default();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(t: usize, values: impl IntoIterator<Item = i32>) -> BTree<i32> {
        let mut btree = BTree::new(t).unwrap();
        for v in values {
            btree.insert(v);
        }
        btree
    }

    fn keys(btree: &BTree<i32>) -> Vec<i32> {
        btree.iter().copied().collect()
    }

    fn assert_valid(btree: &BTree<i32>) {
        if let Err(violation) = btree.check_invariants() {
            panic!("{violation}\n{btree}");
        }
    }

    #[test]
    fn test_new_btree() {
        let btree: BTree<i32> = BTree::new(3).unwrap();
        assert!(btree.is_empty());
        assert_eq!(btree.len(), 0);
        assert_eq!(btree.height(), 0);
        assert!(!btree.contains(&5));
    }

    #[test]
    fn test_invalid_degree() {
        assert_eq!(BTree::<i32>::new(1).err(), Some(Error::InvalidDegree { degree: 1 }));
        assert_eq!(BTree::<i32>::new(0).err(), Some(Error::InvalidDegree { degree: 0 }));
        assert!(BTree::<i32>::new(2).is_ok());
    }

    #[test]
    fn test_insert_causes_root_split() {
        // t = 2 allows 3 keys per node, so the fourth insert splits the root
        let btree = tree_of(2, [10, 20, 30, 40]);

        assert_eq!(btree.height(), 2);
        assert_eq!(btree.node_count(), 3);
        assert_eq!(keys(&btree), vec![10, 20, 30, 40]);
        assert_valid(&btree);
    }

    #[test]
    fn test_insert_ascending_order() {
        let btree = tree_of(2, 1..=10);
        for i in 1..=10 {
            assert!(btree.contains(&i));
        }
        assert!(!btree.contains(&11));
        assert_valid(&btree);
    }

    #[test]
    fn test_insert_descending_order() {
        let btree = tree_of(2, (1..=10).rev());
        for i in 1..=10 {
            assert!(btree.contains(&i));
        }
        assert_valid(&btree);
    }

    #[test]
    fn test_insert_random_order() {
        let values = vec![50, 30, 70, 20, 40, 60, 80, 10, 90];
        let btree = tree_of(3, values.iter().copied());

        for val in &values {
            assert!(btree.contains(val));
        }
        assert!(!btree.contains(&25));
        assert_valid(&btree);
    }

    #[test]
    fn test_insert_duplicate_is_rejected() {
        let mut btree = tree_of(2, 1..=10);
        let before = keys(&btree);

        for i in 1..=10 {
            assert!(!btree.insert(i));
        }
        assert_eq!(btree.len(), 10);
        assert_eq!(keys(&btree), before);
        assert_valid(&btree);
    }

    #[test]
    fn test_traverse_order() {
        let btree = tree_of(2, [5, 3, 7, 1, 9]);
        assert_eq!(btree.traverse(), vec![&1, &3, &5, &7, &9]);
    }

    #[test]
    fn test_traverse_is_restartable() {
        let btree = tree_of(2, 1..=20);
        let first: Vec<_> = btree.iter().collect();
        let second: Vec<_> = btree.iter().collect();
        assert_eq!(first, second);
        assert_eq!(btree.iter().len(), 20);
    }

    #[test]
    fn test_first_and_last() {
        let btree = tree_of(3, [42, 7, 99, 13, 56, 1, 77]);
        assert_eq!(btree.first(), Some(&1));
        assert_eq!(btree.last(), Some(&99));

        let empty: BTree<i32> = BTree::default();
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }

    #[test]
    fn test_get_returns_stored_key() {
        let btree: BTree<String> = ["apple", "banana", "cherry"].iter().map(|s| s.to_string()).collect();
        assert_eq!(btree.get(&"banana".to_string()).map(String::as_str), Some("banana"));
        assert_eq!(btree.get(&"date".to_string()), None);
    }

    #[test]
    fn test_larger_degree() {
        let btree = tree_of(5, 1..=20);
        for i in 1..=20 {
            assert!(btree.contains(&i));
        }
        assert_eq!(btree.height(), 2);
        assert_valid(&btree);
    }

    #[test]
    fn test_display_structure() {
        let btree = tree_of(2, 1..=4);
        let rendered = btree.to_string();
        assert_eq!(
            rendered,
            "=== BTree Structure (t = 2) ===\n\
             Node (leaf=false): [2]\n  \
             Node (leaf=true): [1]\n  \
             Node (leaf=true): [3, 4]\n"
        );

        let empty: BTree<i32> = BTree::default();
        assert_eq!(empty.to_string(), "=== EMPTY BTREE ===\n");
    }

    #[test]
    fn test_debug_prints_key_set() {
        let btree = tree_of(2, [3, 1, 2]);
        assert_eq!(format!("{btree:?}"), "{1, 2, 3}");
    }

    #[test]
    fn test_delete_from_leaf_simple() {
        let mut btree = tree_of(3, [10, 20]);

        assert_eq!(btree.remove(&10), Ok(10));
        assert!(!btree.contains(&10));
        assert!(btree.contains(&20));
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_single_element() {
        let mut btree = tree_of(3, [10]);

        assert_eq!(btree.remove(&10), Ok(10));
        assert!(btree.is_empty());
        assert_eq!(btree.height(), 0);
        assert!(btree.traverse().is_empty());
    }

    #[test]
    fn test_delete_from_empty_tree() {
        let mut btree: BTree<i32> = BTree::new(3).unwrap();
        assert_eq!(btree.remove(&10), Err(Error::EmptyTree));
    }

    #[test]
    fn test_delete_nonexistent_value() {
        let mut btree = tree_of(3, [10, 20]);
        assert_eq!(btree.remove(&15), Err(Error::KeyNotFound));
        assert_eq!(keys(&btree), vec![10, 20]);
        assert_eq!(btree.len(), 2);
    }

    #[test]
    fn test_delete_nonexistent_value_in_deep_tree() {
        let mut btree = tree_of(2, (1..=40).map(|i| i * 2));
        let before = keys(&btree);

        for missing in [0, 1, 41, 81, 99] {
            assert_eq!(btree.remove(&missing), Err(Error::KeyNotFound));
            assert_eq!(keys(&btree), before);
            assert_valid(&btree);
        }
    }

    #[test]
    fn test_delete_causes_borrow_from_next() {
        // t = 2: root [2], children [1] and [3, 4]
        let mut btree = tree_of(2, 1..=4);
        assert_eq!(btree.remove(&1), Ok(1));

        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![3]);
        assert_eq!(root.children[0].keys, vec![2]);
        assert_eq!(root.children[1].keys, vec![4]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_causes_borrow_from_prev() {
        // t = 2: root [3], children [1, 2] and [4]
        let mut btree = tree_of(2, [4, 3, 2, 1]);
        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![3]);
        assert_eq!(root.children[0].keys, vec![1, 2]);

        assert_eq!(btree.remove(&4), Ok(4));

        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![2]);
        assert_eq!(root.children[0].keys, vec![1]);
        assert_eq!(root.children[1].keys, vec![3]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_from_internal_node_uses_predecessor() {
        // t = 2: root [2], children [0, 1] and [3]; the left child can spare a key
        let mut btree = tree_of(2, [2, 1, 3, 0]);
        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![2]);
        assert_eq!(root.children[0].keys, vec![0, 1]);

        assert_eq!(btree.remove(&2), Ok(2));

        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![1]);
        assert_eq!(root.children[0].keys, vec![0]);
        assert_eq!(root.children[1].keys, vec![3]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_from_internal_node_uses_successor() {
        let mut btree = tree_of(2, 1..=4);
        assert_eq!(btree.remove(&2), Ok(2));

        let root = btree.root.as_ref().unwrap();
        assert_eq!(root.keys, vec![3]);
        assert_eq!(root.children[0].keys, vec![1]);
        assert_eq!(root.children[1].keys, vec![4]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_from_internal_node_merges_children() {
        // t = 2: root [2], children [1] and [3]; both minimal so they merge around 2
        let mut btree = tree_of(2, 1..=4);
        btree.remove(&4).unwrap();
        assert_eq!(btree.height(), 2);

        assert_eq!(btree.remove(&2), Ok(2));

        assert_eq!(btree.height(), 1);
        assert_eq!(btree.node_count(), 1);
        assert_eq!(btree.root.as_ref().unwrap().keys, vec![1, 3]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_multiple_sequential() {
        let mut btree = tree_of(2, 1..=10);

        for i in 1..=5 {
            assert_eq!(btree.remove(&i), Ok(i));
            assert_valid(&btree);
        }

        for i in 1..=5 {
            assert!(!btree.contains(&i));
        }
        for i in 6..=10 {
            assert!(btree.contains(&i));
        }
    }

    #[test]
    fn test_delete_all_elements() {
        let values = vec![1, 2, 3, 4, 5, 6, 7];
        let mut btree = tree_of(2, values.iter().copied());

        for val in &values {
            assert_eq!(btree.remove(val), Ok(*val));
            assert!(!btree.contains(val));
            assert_valid(&btree);
        }
        assert!(btree.is_empty());
        assert_eq!(btree.remove(&1), Err(Error::EmptyTree));
    }

    #[test]
    fn test_delete_descending_order() {
        let mut btree = tree_of(2, 1..=10);

        for i in (1..=10).rev() {
            assert_eq!(btree.remove(&i), Ok(i));
            assert_valid(&btree);
        }
        assert!(btree.is_empty());
    }

    #[test]
    fn test_delete_random_order() {
        let values = vec![50, 30, 70, 20, 40, 60, 80, 10, 90];
        let mut btree = tree_of(3, values.iter().copied());

        let delete_order = vec![30, 70, 10, 90, 50];
        for val in &delete_order {
            assert_eq!(btree.remove(val), Ok(*val));
            assert_valid(&btree);
        }

        for val in &values {
            assert_eq!(btree.contains(val), !delete_order.contains(val));
        }
    }

    #[test]
    fn test_delete_root_shrinkage() {
        let mut btree = tree_of(2, 1..=4);
        assert_eq!(btree.height(), 2);

        btree.remove(&1).unwrap();
        btree.remove(&2).unwrap();

        assert_eq!(btree.height(), 1);
        assert!(btree.contains(&3));
        assert!(btree.contains(&4));
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_with_larger_degree() {
        let mut btree = tree_of(4, 1..=50);

        // Delete every third element
        for i in (1..=50).step_by(3) {
            btree.remove(&i).unwrap();
        }
        assert_valid(&btree);

        for i in 1..=50 {
            assert_eq!(btree.contains(&i), i % 3 != 1);
        }
    }

    #[test]
    fn test_delete_insert_interleaved() {
        let mut btree = tree_of(2, 1..=10);

        btree.remove(&5).unwrap();
        btree.insert(15);
        btree.remove(&3).unwrap();
        btree.insert(13);

        assert_eq!(keys(&btree), vec![1, 2, 4, 6, 7, 8, 9, 10, 13, 15]);
        assert_valid(&btree);
    }

    #[test]
    fn test_delete_string_values() {
        let values = vec!["apple", "banana", "cherry", "date", "elderberry"];
        let mut btree: BTree<String> = BTree::new(2).unwrap();
        for val in &values {
            btree.insert(val.to_string());
        }

        assert_eq!(btree.remove(&"banana".to_string()).as_deref(), Ok("banana"));
        assert_eq!(btree.remove(&"date".to_string()).as_deref(), Ok("date"));

        let remaining: Vec<&str> = btree.iter().map(String::as_str).collect();
        assert_eq!(remaining, vec!["apple", "cherry", "elderberry"]);
    }

    #[test]
    fn test_delete_maintains_btree_properties() {
        let mut btree = tree_of(3, 1..=100);

        // Delete half of them
        for i in (1..=100).step_by(2) {
            btree.remove(&i).unwrap();
            assert_valid(&btree);
        }

        for i in 1..=100 {
            assert_eq!(btree.contains(&i), i % 2 == 0);
        }
        assert_eq!(btree.len(), 50);
    }

    #[test]
    fn test_clear() {
        let mut btree = tree_of(2, 1..=10);
        btree.clear();
        assert!(btree.is_empty());
        assert_eq!(btree.len(), 0);
        assert_eq!(btree.degree().get(), 2);
        assert!(btree.insert(1));
    }

    #[test]
    fn test_into_iter_is_sorted() {
        let btree = tree_of(3, [9, 4, 7, 1, 8, 2, 6, 3, 5]);
        let owned: Vec<i32> = btree.into_iter().collect();
        assert_eq!(owned, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_extend_and_insert_all() {
        let mut btree: BTree<i32> = BTree::default();
        btree.extend([3, 1, 2]);
        assert_eq!(btree.insert_all([2, 3, 4, 5]), 2);
        assert_eq!(keys(&btree), vec![1, 2, 3, 4, 5]);
    }
}
