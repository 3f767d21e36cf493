use std::cmp::Ordering;
use std::fmt;
use std::mem;

use log::trace;

use crate::degree::MinDegree;

// A node holds between t-1 and 2t-1 keys (the root may hold fewer) and, when internal,
// exactly one more child than it has keys. children[i] holds keys less than keys[i],
// children[i + 1] holds keys greater than keys[i].
pub(crate) struct Node<T> {
    pub(crate) keys: Vec<T>,
    pub(crate) children: Vec<Box<Node<T>>>,
    pub(crate) leaf: bool,
    degree: MinDegree,
}

impl<T> Node<T> {
    /// Creates a leaf node holding a single key (the first key of a new tree)
    pub(crate) fn with_key(degree: MinDegree, value: T) -> Self {
        Node {
            keys: vec![value],
            children: vec![],
            leaf: true,
            degree,
        }
    }

    /// Creates a keyless internal node over `children` (a new root about to split its only child)
    pub(crate) fn new_internal(degree: MinDegree, children: Vec<Box<Node<T>>>) -> Self {
        Node {
            keys: vec![],
            children,
            leaf: false,
            degree,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() == self.degree.max_keys()
    }

    /// Collects references to all keys of the subtree in order
    pub(crate) fn traverse<'a>(&'a self, out: &mut Vec<&'a T>) {
        // Loop through first n children and keys
        for i in 0..self.keys.len() {
            if !self.leaf {
                self.children[i].traverse(out);
            }
            out.push(&self.keys[i]);
        }
        // Traverse last child if not leaf
        if !self.leaf {
            self.children[self.keys.len()].traverse(out);
        }
    }

    /// Moves all keys of the subtree into `out` in order, consuming the subtree
    pub(crate) fn drain_into(self, out: &mut Vec<T>) {
        if self.leaf {
            out.extend(self.keys);
            return;
        }
        let mut children = self.children.into_iter();
        for key in self.keys {
            if let Some(child) = children.next() {
                child.drain_into(out);
            }
            out.push(key);
        }
        for child in children {
            child.drain_into(out);
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Rightmost (largest) key in the subtree
    pub(crate) fn rightmost(&self) -> Option<&T> {
        let mut node = self;
        loop {
            if node.leaf {
                return node.keys.last();
            }
            node = node.children.last()?;
        }
    }

    /// Leftmost (smallest) key in the subtree
    pub(crate) fn leftmost(&self) -> Option<&T> {
        let mut node = self;
        loop {
            if node.leaf {
                return node.keys.first();
            }
            node = node.children.first()?;
        }
    }

    /// Largest key of children[idx], used to replace keys[idx] on deletion
    fn get_predecessor(&self, idx: usize) -> Option<&T> {
        self.children[idx].rightmost()
    }

    /// Smallest key of children[idx + 1], used to replace keys[idx] on deletion
    fn get_successor(&self, idx: usize) -> Option<&T> {
        self.children[idx + 1].leftmost()
    }

    /// Splits the full child at `child_idx` into 2 nodes and moves its median key up into this node
    ///
    /// Both halves are left with exactly t-1 keys
    pub(crate) fn split_child(&mut self, child_idx: usize) {
        let t = self.degree.get();
        let child = &mut self.children[child_idx];
        debug_assert_eq!(child.keys.len(), self.degree.max_keys());

        // Median sits at index t-1, the right half takes the top t-1 keys and, if internal,
        // the top t children
        let mut right_keys: Vec<T> = child.keys.split_off(t - 1);
        let middle_key = right_keys.remove(0);
        let right_children: Vec<Box<Node<T>>> = if child.leaf {
            vec![]
        } else {
            child.children.split_off(t)
        };

        let new_node = Node {
            keys: right_keys,
            children: right_children,
            leaf: child.leaf,
            degree: self.degree,
        };
        trace!(
            "split child {} ({} node), {} keys each side",
            child_idx,
            if new_node.leaf { "leaf" } else { "internal" },
            t - 1
        );

        self.keys.insert(child_idx, middle_key);
        self.children.insert(child_idx + 1, Box::new(new_node));
    }

    /// Moves the last key of children[idx - 1] up into this node and this node's separator
    /// down to the front of children[idx]
    fn borrow_from_prev(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx);
        let sibling = &mut left[idx - 1];
        let child = &mut right[0];

        let Some(sibling_key) = sibling.keys.pop() else {
            return;
        };
        let separator = mem::replace(&mut self.keys[idx - 1], sibling_key);
        child.keys.insert(0, separator);

        // Move sibling's last child to child's first child
        if !child.leaf {
            if let Some(last_child) = sibling.children.pop() {
                child.children.insert(0, last_child);
            }
        }
        trace!("child {} borrowed a key from its left sibling", idx);
    }

    /// Moves the first key of children[idx + 1] up into this node and this node's separator
    /// down to the back of children[idx]
    fn borrow_from_next(&mut self, idx: usize) {
        let (left, right) = self.children.split_at_mut(idx + 1);
        let child = &mut left[idx];
        let sibling = &mut right[0];

        if sibling.keys.is_empty() {
            return;
        }
        let sibling_key = sibling.keys.remove(0);
        let separator = mem::replace(&mut self.keys[idx], sibling_key);
        child.keys.push(separator);

        // Move sibling's first child to child's last child
        if !child.leaf && !sibling.children.is_empty() {
            let first_child = sibling.children.remove(0);
            child.children.push(first_child);
        }
        trace!("child {} borrowed a key from its right sibling", idx);
    }

    /// Merges children[idx], keys[idx] and children[idx + 1] into children[idx]
    ///
    /// Applied to two children of t-1 keys each, the result holds 2t-1 keys
    fn merge(&mut self, idx: usize) {
        let middle_key = self.keys.remove(idx);
        // Remove right child (transfers ownership)
        let mut right_child = self.children.remove(idx + 1);

        let left_child = &mut self.children[idx];
        left_child.keys.push(middle_key);
        left_child.keys.append(&mut right_child.keys);
        if !left_child.leaf {
            left_child.children.append(&mut right_child.children);
        }
        trace!(
            "merged children {} and {} into a node of {} keys",
            idx,
            idx + 1,
            left_child.keys.len()
        );
    }

    /// Ensures children[idx] holds at least t keys before descending into it
    fn fill(&mut self, idx: usize) {
        let min_keys = self.degree.min_keys();
        let last = self.keys.len();

        if idx != 0 && self.children[idx - 1].keys.len() > min_keys {
            self.borrow_from_prev(idx);
        } else if idx != last && self.children[idx + 1].keys.len() > min_keys {
            self.borrow_from_next(idx);
        } else if idx != last {
            self.merge(idx);
        } else {
            // The last child has no right sibling, so it is merged into its left one
            self.merge(idx - 1);
        }
    }

    /// Format the subtree one node per line, indented by depth
    pub(crate) fn fmt_structure(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result
    where
        T: fmt::Debug,
    {
        let indent = "  ".repeat(level);
        writeln!(f, "{}Node (leaf={}): {:?}", indent, self.leaf, self.keys)?;
        for child in &self.children {
            child.fmt_structure(f, level + 1)?;
        }
        Ok(())
    }
}

impl<T: Ord> Node<T> {
    /// Index of the first key greater than or equal to `target`, or `keys.len()` if there is none
    pub(crate) fn locate_key_index(&self, target: &T) -> usize {
        self.keys.partition_point(|key| key < target)
    }

    /// Returns whether `value` is a key of this node, along with the index it was found at
    /// (or the index of the child it would belong in)
    pub(crate) fn search(&self, value: &T) -> (bool, usize) {
        let idx = self.locate_key_index(value);
        let found = idx < self.keys.len() && self.keys[idx] == *value;
        (found, idx)
    }

    /// Inserts a value into the subtree rooted at this node
    ///
    /// Assumes the node is non-full when called. Returns false, leaving the key set
    /// unchanged, if an equal key is already present.
    pub(crate) fn insert_non_full(&mut self, value: T) -> bool {
        let (found, mut idx) = self.search(&value);
        if found {
            return false;
        }

        if self.leaf {
            self.keys.insert(idx, value);
            return true;
        }

        if self.children[idx].is_full() {
            self.split_child(idx);
            // Choose left or right half depending on the key that was promoted into idx
            match value.cmp(&self.keys[idx]) {
                Ordering::Equal => return false,
                Ordering::Greater => idx += 1,
                Ordering::Less => {}
            }
        }
        self.children[idx].insert_non_full(value)
    }
}

impl<T: Ord + Clone> Node<T> {
    /// Removes `value` from the subtree rooted at this node, returning the removed key
    ///
    /// Every child is topped up to at least t keys before it is entered, so a single
    /// downward pass is enough. Returns None if the key is not in the subtree.
    pub(crate) fn remove(&mut self, value: &T) -> Option<T> {
        let (found, idx) = self.search(value);

        if found {
            return if self.leaf {
                Some(self.remove_from_leaf(idx))
            } else {
                self.remove_from_non_leaf(idx, value)
            };
        }

        if self.leaf {
            return None;
        }

        if self.children[idx].keys.len() < self.degree.get() {
            self.fill(idx);
        }

        // Filling the last child may have merged it into its left sibling, leaving idx one
        // past the end. Any other repair keeps the target subtree at idx.
        if idx > self.keys.len() {
            self.children[idx - 1].remove(value)
        } else {
            self.children[idx].remove(value)
        }
    }

    fn remove_from_leaf(&mut self, idx: usize) -> T {
        self.keys.remove(idx)
    }

    fn remove_from_non_leaf(&mut self, idx: usize, value: &T) -> Option<T> {
        let t = self.degree.get();

        if self.children[idx].keys.len() >= t {
            // Left subtree can spare a key: replace with the predecessor
            let pred = self.get_predecessor(idx)?.clone();
            self.children[idx].remove(&pred);
            Some(mem::replace(&mut self.keys[idx], pred))
        } else if self.children[idx + 1].keys.len() >= t {
            // Right subtree can spare a key: replace with the successor
            let succ = self.get_successor(idx)?.clone();
            self.children[idx + 1].remove(&succ);
            Some(mem::replace(&mut self.keys[idx], succ))
        } else {
            // Both sides are minimal, so the key moves down into the merged child
            self.merge(idx);
            self.children[idx].remove(value)
        }
    }
}
