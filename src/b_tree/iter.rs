use std::iter::FusedIterator;

use super::node::Node;

/// Lazy in-order iterator over the keys of a [`BTree`](crate::BTree).
///
/// Created by [`BTree::iter`](crate::BTree::iter).
pub struct Iter<'a, T> {
    // Path from the root to the next key: each node paired with the index of its next key
    stack: Vec<(&'a Node<T>, usize)>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Iter {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(r) = root {
            iter.push_leftmost(r);
        }
        iter
    }

    fn push_leftmost(&mut self, mut node: &'a Node<T>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) if !node.leaf => node = child.as_ref(),
                _ => break,
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, idx) = self.stack.last_mut()?;
            let node: &'a Node<T> = *node;
            if *idx < node.keys.len() {
                let key_idx = *idx;
                *idx += 1;
                // Everything right of this key comes before the node's next key
                if !node.leaf {
                    self.push_leftmost(&node.children[key_idx + 1]);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys[key_idx]);
            }
            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Owning in-order iterator over the keys of a [`BTree`](crate::BTree).
///
/// Created by `BTree::into_iter`.
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(super) fn new(root: Option<Box<Node<T>>>, len: usize) -> Self {
        let mut keys = Vec::with_capacity(len);
        if let Some(r) = root {
            r.drain_into(&mut keys);
        }
        IntoIter {
            inner: keys.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}
