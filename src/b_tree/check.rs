use super::BTree;
use super::node::Node;
use crate::error::Violation;

/// Running state for one invariant walk
struct Walk {
    leaf_depth: Option<usize>,
    keys_seen: usize,
}

impl<T: Ord> BTree<T> {
    /// Verifies every structural invariant of the tree
    ///
    /// Checks that keys are strictly ascending within each node and separated by their
    /// parent's keys, that all leaves sit at one depth, that non-root nodes hold between
    /// t-1 and 2t-1 keys, and that internal nodes have one more child than keys.
    pub fn check_invariants(&self) -> Result<(), Violation> {
        let Some(root) = &self.root else {
            return match self.len {
                0 => Ok(()),
                recorded => Err(Violation::LengthMismatch { recorded, actual: 0 }),
            };
        };
        if root.keys.is_empty() {
            return Err(Violation::EmptyRoot);
        }

        let mut walk = Walk {
            leaf_depth: None,
            keys_seen: 0,
        };
        self.check_node(root, 0, None, None, &mut walk)?;

        if walk.keys_seen != self.len {
            return Err(Violation::LengthMismatch {
                recorded: self.len,
                actual: walk.keys_seen,
            });
        }
        Ok(())
    }

    fn check_node(
        &self,
        node: &Node<T>,
        depth: usize,
        lower: Option<&T>,
        upper: Option<&T>,
        walk: &mut Walk,
    ) -> Result<(), Violation> {
        let keys = node.keys.len();
        let (min, max) = if depth == 0 {
            (0, self.degree.max_keys())
        } else {
            (self.degree.min_keys(), self.degree.max_keys())
        };
        if keys < min || keys > max {
            return Err(Violation::KeyCount { depth, keys, min, max });
        }

        if node.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Violation::UnsortedKeys { depth });
        }
        let below_lower = lower.is_some_and(|l| node.keys.first().is_some_and(|k| k <= l));
        let above_upper = upper.is_some_and(|u| node.keys.last().is_some_and(|k| k >= u));
        if below_lower || above_upper {
            return Err(Violation::SeparatorOrder { depth });
        }
        walk.keys_seen += keys;

        if node.leaf {
            if !node.children.is_empty() {
                return Err(Violation::LeafWithChildren {
                    depth,
                    children: node.children.len(),
                });
            }
            return match walk.leaf_depth {
                None => {
                    walk.leaf_depth = Some(depth);
                    Ok(())
                }
                Some(expected) if expected != depth => Err(Violation::UnevenLeaves { depth, expected }),
                Some(_) => Ok(()),
            };
        }

        if node.children.len() != keys + 1 {
            return Err(Violation::ChildCount {
                depth,
                keys,
                children: node.children.len(),
            });
        }
        for (i, child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
            let child_upper = if i == keys { upper } else { Some(&node.keys[i]) };
            self.check_node(child, depth + 1, child_lower, child_upper, walk)?;
        }
        Ok(())
    }
}
