mod child_bitmap;
mod node;

pub mod iterators;
pub mod query;


use std::mem;

use log::{debug, trace};

use crate::types::errors::PhTreeError;
use crate::types::stats::TreeStats;
use crate::types::{PhKey, Point, TreeMapping};

use self::iterators::Iter;
use self::node::{Child, Entry, Node};

//------------ PhTree -------------------------------------------------------

/// A map from D-dimensional points to elements, stored as a patricia-style
/// trie over the interleaved bits of the point's keys.
///
/// At every node one bit level of every dimension is decided at once, so a
/// node has up to 2^D children, addressed by a D-bit hypercube address.
/// Runs of bit levels without any branching are compressed away. Lookups,
/// inserts and removals visit at most one node per bit of the key width;
/// window queries prune whole subtrees by comparing node prefixes against
/// the query bounds.
///
/// The tree is parameterised over the key width (`K`), the dimensionality
/// (`D`, 1 through 6) and a [`TreeMapping`] that translates the caller's
/// domain values into points and elements at the public boundary.
///
/// A tree supports any number of concurrent readers _or_ one writer, which
/// is what the borrow checker enforces anyway; none of the methods lock.
pub struct PhTree<K: PhKey, const D: usize, M: TreeMapping<K, D>> {
    root: Node<K, D, M::Element>,
    mapping: M,
    // elements currently stored; entries whose construction failed are
    // structurally present but not counted
    element_count: usize,
}

impl<K: PhKey, const D: usize, M: TreeMapping<K, D>> PhTree<K, D, M> {
    /// Create an empty tree with the given mapping installed.
    ///
    /// # Panics
    ///
    /// Panics if `D` is 0 or greater than 6.
    pub fn new(mapping: M) -> Self {
        assert!(
            D >= 1 && D <= 6,
            "supported dimensionalities are 1 through 6"
        );

        PhTree {
            root: Node::new_root(),
            mapping,
            element_count: 0,
        }
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Insert an element for `index`.
    ///
    /// If an element already lives at the index's point it is returned
    /// untouched; otherwise an entry is created and the mapping's element
    /// constructor is run once. A constructor that declines leaves the
    /// entry without an element and reports
    /// [`PhTreeError::ElementCreationFailed`].
    pub fn insert(
        &mut self,
        index: &M::Index,
    ) -> Result<&mut M::Element, PhTreeError> {
        let point = self.mapping.point_of(index);
        trace!("insert at {}", point);

        let mapping = &self.mapping;
        let element_count = &mut self.element_count;

        let mut node = &mut self.root;
        while !node.is_leaf() {
            node = node.add_point(&point);
        }

        let address = node.address_of(&point);
        let entry = match node.child_mut(address) {
            Some(child) => child.entry_mut(),
            None => unreachable!("insert descent always lands on an entry"),
        };

        if entry.element.is_none() {
            let element = mapping
                .element_of(index)
                .ok_or(PhTreeError::ElementCreationFailed)?;
            entry.element = Some(element);
            *element_count += 1;
        }

        entry
            .element
            .as_mut()
            .ok_or(PhTreeError::ElementCreationFailed)
    }

    /// Look up the element at `index`, if there is one.
    pub fn find(&self, index: &M::Index) -> Option<&M::Element> {
        let point = self.mapping.point_of(index);
        self.find_entry(&point).and_then(|e| e.element.as_ref())
    }

    pub fn find_mut(&mut self, index: &M::Index) -> Option<&mut M::Element> {
        let point = self.mapping.point_of(index);

        let mut node = &mut self.root;
        loop {
            if node.is_leaf() {
                let address = node.address_of(&point);
                let entry = node.child_mut(address)?.entry_mut();
                if entry.point != point {
                    return None;
                }
                return entry.element.as_mut();
            }

            if !point.prefix_eq(&node.point, node.postfix_len) {
                return None;
            }

            let address = node.address_of(&point);
            node = node.child_mut(address)?.node_mut();
        }
    }

    fn find_entry(
        &self,
        point: &Point<K, D>,
    ) -> Option<&Entry<K, D, M::Element>> {
        let mut node = &self.root;
        loop {
            if node.is_leaf() {
                let address = node.address_of(point);
                let entry = node.child(address)?.entry();
                if entry.point != *point {
                    return None;
                }
                return Some(entry);
            }

            // a diverging prefix means the point lies in a part of the
            // space this subtree does not cover
            if !point.prefix_eq(&node.point, node.postfix_len) {
                return None;
            }

            let address = node.address_of(point);
            node = node.child(address)?.node();
        }
    }

    /// Remove the element at `index`. Nothing happens if the point is not
    /// in the tree.
    ///
    /// Removal restores path compression: a node left with a single child
    /// is collapsed into its parent's slot.
    pub fn remove(&mut self, index: &M::Index) {
        let point = self.mapping.point_of(index);

        if let Some(entry) = remove_point(&mut self.root, &point) {
            trace!("removed entry at {}", entry.point);
            if entry.element.is_some() {
                self.element_count -= 1;
            }
        }
    }

    /// The number of elements in the tree.
    pub fn len(&self) -> usize {
        self.element_count
    }

    /// Whether the tree holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.root.child_count() == 0
    }

    /// Drop every entry and element, leaving an empty tree.
    pub fn clear(&mut self) {
        debug!("clear tree");
        self.root = Node::new_root();
        self.element_count = 0;
    }

    /// Run `op` on every element, depth-first, by ascending hypercube
    /// address within each node. The tree must not be mutated from inside
    /// the closure, which the borrow checker enforces.
    pub fn for_each<F: FnMut(&M::Element)>(&self, mut op: F) {
        visit_elements(&self.root, &mut op);
    }

    /// Iterate over `(point, element)` pairs in the same deterministic
    /// order [`for_each`](Self::for_each) visits them.
    pub fn iter(&self) -> Iter<'_, K, D, M::Element> {
        Iter::new(&self.root)
    }

    /// Walk the tree and report its shape. The root is not counted, so an
    /// empty tree reports zero everywhere.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            node_size: mem::size_of::<Node<K, D, M::Element>>(),
            ..Default::default()
        };
        collect_stats(&self.root, 0, &mut stats);
        stats
    }
}

// Recursive removal. The descent mirrors `find_entry` (address plus prefix
// checks), so an absent point is a strict no-op. The parent frame performs
// the structural maintenance after the recursive call returns: an emptied
// leaf is unlinked, and an inner child left with a single grandchild is
// collapsed so that no single-child chain survives.
fn remove_point<K: PhKey, const D: usize, T>(
    node: &mut Node<K, D, T>,
    point: &Point<K, D>,
) -> Option<Entry<K, D, T>> {
    if node.is_leaf() {
        let address = node.address_of(point);
        match node.child(address) {
            Some(child) if child.entry().point == *point => {}
            _ => return None,
        }
        return match node.remove_child(address) {
            Child::Entry(entry) => Some(entry),
            Child::Node(_) => unreachable!("leaves only hold entries"),
        };
    }

    if !point.prefix_eq(&node.point, node.postfix_len) {
        return None;
    }

    let address = node.address_of(point);
    let removed = remove_point(node.child_mut(address)?.node_mut(), point)?;

    let node_postfix_len = node.postfix_len;
    let sub_node = match node.child_mut(address) {
        Some(child) => child.node_mut(),
        None => unreachable!("the descended child cannot have vanished"),
    };

    if sub_node.is_leaf() && sub_node.child_count() == 0 {
        debug!("unlink empty leaf at {}", sub_node.point);
        node.remove_child(address);
    } else if !sub_node.is_leaf() && sub_node.child_count() == 1 {
        // absorb the extra distance into the survivor's infix
        if let Some(Child::Node(mut grandchild)) = sub_node.take_sole_child()
        {
            grandchild.infix_len =
                node_postfix_len - grandchild.postfix_len - 1;
            debug!(
                "collapse single-child node at {} into postfix {}",
                sub_node.point, node_postfix_len
            );
            *sub_node = grandchild;
        }
    }

    Some(removed)
}

fn visit_elements<K: PhKey, const D: usize, T>(
    node: &Node<K, D, T>,
    op: &mut impl FnMut(&T),
) {
    if node.is_leaf() {
        for child in &node.children {
            if let Some(element) = child.entry().element.as_ref() {
                op(element);
            }
        }
        return;
    }

    for child in &node.children {
        visit_elements(child.node(), op);
    }
}

fn collect_stats<K: PhKey, const D: usize, T>(
    node: &Node<K, D, T>,
    depth: u32,
    stats: &mut TreeStats,
) {
    for child in &node.children {
        match child {
            Child::Node(sub_node) => {
                if sub_node.is_leaf() {
                    stats.leaf_nodes += 1;
                } else {
                    stats.inner_nodes += 1;
                }
                stats.max_depth = stats.max_depth.max(depth + 1);
                collect_stats(sub_node, depth + 1, stats);
            }
            Child::Entry(entry) => {
                if entry.element.is_some() {
                    stats.entries += 1;
                }
            }
        }
    }
}
