use std::slice;

use crate::ph_tree::node::{Child, Node};
use crate::types::{PhKey, Point};

//------------ Iter ---------------------------------------------------------

/// A depth-first iterator over the `(point, element)` pairs of a tree.
///
/// Children are visited by ascending hypercube address, so the order is
/// deterministic and matches `for_each`. Entries without an element (failed
/// construction) are skipped.
///
/// The cursor is a stack of child-slice iterators, one per level of the
/// descent, bounded by the key width.
pub struct Iter<'a, K: PhKey, const D: usize, T> {
    stack: Vec<slice::Iter<'a, Child<K, D, T>>>,
}

impl<'a, K: PhKey, const D: usize, T> Iter<'a, K, D, T> {
    pub(crate) fn new(root: &'a Node<K, D, T>) -> Self {
        Iter {
            stack: vec![root.children.iter()],
        }
    }
}

impl<'a, K: PhKey, const D: usize, T> Iterator for Iter<'a, K, D, T> {
    type Item = (Point<K, D>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cursor = self.stack.last_mut()?;

            match cursor.next() {
                None => {
                    self.stack.pop();
                }
                Some(Child::Node(node)) => {
                    self.stack.push(node.children.iter());
                }
                Some(Child::Entry(entry)) => {
                    if let Some(element) = entry.element.as_ref() {
                        return Some((entry.point, element));
                    }
                }
            }
        }
    }
}
