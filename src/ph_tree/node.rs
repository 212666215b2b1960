use std::fmt::Debug;
use std::mem;

use log::debug;

use crate::ph_tree::child_bitmap::ChildBitmap;
use crate::types::{PhKey, Point};

//------------ Node ---------------------------------------------------------

// A path-compressed trie node. `point` is the center of the subspace the
// node covers: all postfix bits are zero and the bit at `postfix_len` is
// one in every dimension. Window queries compare query bounds directly
// against this center to build their child filter masks, so the centering
// is maintained on every node creation.
//
// The children array is dense and ordered by ascending hypercube address;
// `active_children` says which addresses are populated and where (by
// popcount) each one sits in the array.
pub(crate) struct Node<K: PhKey, const D: usize, T> {
    pub(crate) point: Point<K, D>,
    // the distance to the parent, NOT inclusive: a parent at postfix 5
    // with a child at postfix 1 puts the child's infix at 3
    pub(crate) infix_len: u32,
    // how many undecided bit levels are below this node; 0 makes it a leaf
    pub(crate) postfix_len: u32,
    pub(crate) active_children: ChildBitmap,
    pub(crate) children: Vec<Child<K, D, T>>,
}

// A child slot holds either a deeper node or, under a leaf, an entry that
// owns the element stored for one exact point.
pub(crate) enum Child<K: PhKey, const D: usize, T> {
    Node(Node<K, D, T>),
    Entry(Entry<K, D, T>),
}

pub(crate) struct Entry<K: PhKey, const D: usize, T> {
    pub(crate) point: Point<K, D>,
    // `None` marks an entry whose element construction failed (or has not
    // happened yet); lookups treat it as absent
    pub(crate) element: Option<T>,
}

impl<K: PhKey, const D: usize, T> Child<K, D, T> {
    pub(crate) fn node(&self) -> &Node<K, D, T> {
        match self {
            Child::Node(node) => node,
            Child::Entry(_) => {
                unreachable!("inner nodes only hold nodes")
            }
        }
    }

    pub(crate) fn node_mut(&mut self) -> &mut Node<K, D, T> {
        match self {
            Child::Node(node) => node,
            Child::Entry(_) => {
                unreachable!("inner nodes only hold nodes")
            }
        }
    }

    pub(crate) fn entry(&self) -> &Entry<K, D, T> {
        match self {
            Child::Entry(entry) => entry,
            Child::Node(_) => unreachable!("leaves only hold entries"),
        }
    }

    pub(crate) fn entry_mut(&mut self) -> &mut Entry<K, D, T> {
        match self {
            Child::Entry(entry) => entry,
            Child::Node(_) => unreachable!("leaves only hold entries"),
        }
    }
}

impl<K: PhKey, const D: usize, T> Node<K, D, T> {
    pub(crate) const CHILD_MAX: u32 = 1 << D;

    pub(crate) fn new(
        infix_len: u32,
        postfix_len: u32,
        point: Point<K, D>,
    ) -> Self {
        Node {
            point: point.centered(postfix_len),
            infix_len,
            postfix_len,
            active_children: ChildBitmap::empty(),
            children: Vec::with_capacity(4),
        }
    }

    pub(crate) fn new_root() -> Self {
        Node::new(0, K::BITS - 1, Point::zero())
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.postfix_len == 0
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The hypercube address `point` belongs to at this node.
    pub(crate) fn address_of(&self, point: &Point<K, D>) -> u32 {
        point.address_at(self.postfix_len)
    }

    pub(crate) fn child(&self, address: u32) -> Option<&Child<K, D, T>> {
        if !self.active_children.is_active(address) {
            return None;
        }
        Some(&self.children[self.active_children.index_of(address)])
    }

    pub(crate) fn child_mut(
        &mut self,
        address: u32,
    ) -> Option<&mut Child<K, D, T>> {
        if !self.active_children.is_active(address) {
            return None;
        }
        let index = self.active_children.index_of(address);
        Some(&mut self.children[index])
    }

    fn insert_child(&mut self, address: u32, child: Child<K, D, T>) {
        if self.children.len() == self.children.capacity() {
            // grow by a fixed handful of slots; most nodes stay small
            self.children.reserve_exact(4);
        }

        // activate before asking for the index, so the popcount sees the
        // new bit
        self.active_children.activate(address);
        let index = self.active_children.index_of(address);
        self.children.insert(index, child);
    }

    pub(crate) fn remove_child(&mut self, address: u32) -> Child<K, D, T> {
        let index = self.active_children.index_of(address);
        self.active_children.deactivate(address);
        self.children.remove(index)
    }

    /// Hand out the single remaining child, for collapsing this node away.
    pub(crate) fn take_sole_child(&mut self) -> Option<Child<K, D, T>> {
        if self.children.len() != 1 {
            return None;
        }
        self.active_children = ChildBitmap::empty();
        self.children.pop()
    }

    /// Make sure this leaf has an entry for `point`. An entry that is
    /// already there is left alone; it is what insert will hand back.
    pub(crate) fn add_entry(&mut self, point: &Point<K, D>) {
        debug_assert!(self.is_leaf());

        let address = self.address_of(point);
        if self.active_children.is_active(address) {
            return;
        }

        self.insert_child(
            address,
            Child::Entry(Entry {
                point: *point,
                element: None,
            }),
        );
    }

    /// One descent step of an insert: hand back the child of this node that
    /// `point` continues in, creating a leaf for a vacant slot or splitting
    /// the edge to an existing child whose prefix diverges.
    ///
    /// The node handed back is freshly created exactly when it is a leaf,
    /// so the caller's descent loop terminates on it either way.
    pub(crate) fn add_point(
        &mut self,
        point: &Point<K, D>,
    ) -> &mut Node<K, D, T> {
        debug_assert!(!self.is_leaf());

        let address = self.address_of(point);

        if !self.active_children.is_active(address) {
            // a vacant slot: path compression puts the new child all the
            // way at the bottom, a leaf holding a single entry
            let mut leaf = Node::new(self.postfix_len - 1, 0, *point);
            leaf.add_entry(point);
            self.insert_child(address, Child::Node(leaf));

            return self.children
                [self.active_children.index_of(address)]
            .node_mut();
        }

        self.handle_collision(address, point)
    }

    // Figure out what to do when the slot for `point` is already taken.
    //
    // An infix of zero leaves no room between this node and the child, so
    // the point continues in the child no matter what. Otherwise compare
    // against the child's point:
    //
    //   diverging_bits == child.postfix_len     -> point fits below child
    //   diverging_bits == child.postfix_len + 1 -> point is the child's
    //                                              own subspace
    //   diverging_bits >  child.postfix_len + 1 -> the common prefix ends
    //                                              above the child, split
    //                                              the edge
    fn handle_collision(
        &mut self,
        address: u32,
        point: &Point<K, D>,
    ) -> &mut Node<K, D, T> {
        let index = self.active_children.index_of(address);

        {
            let sub_node = self.children[index].node();
            if sub_node.infix_len > 0 {
                let diverging = point.diverging_bits(&sub_node.point);
                if diverging > sub_node.postfix_len + 1 {
                    return self.split_edge(index, point, diverging);
                }
            }
        }

        let sub_node = self.children[index].node_mut();
        if sub_node.is_leaf() {
            sub_node.add_entry(point);
        }

        sub_node
    }

    // Insert a new node on the edge to the child at `index`, covering the
    // common prefix of the child and `point`. The new node takes over the
    // child's slot (the dense array position stays correct), the old child
    // and a fresh leaf for `point` become its two children.
    fn split_edge(
        &mut self,
        index: usize,
        point: &Point<K, D>,
        diverging_bits: u32,
    ) -> &mut Node<K, D, T> {
        let split = Node::new(
            self.postfix_len - diverging_bits,
            diverging_bits - 1,
            *point,
        );

        let slot = self.children[index].node_mut();
        let mut old_child = mem::replace(slot, split);
        old_child.infix_len = slot.postfix_len - old_child.postfix_len - 1;

        debug!(
            "split edge at {} below postfix {}: old child postfix {}",
            slot.point, slot.postfix_len, old_child.postfix_len
        );

        let old_address = slot.address_of(&old_child.point);
        slot.insert_child(old_address, Child::Node(old_child));

        let new_address = slot.address_of(point);
        let mut leaf = Node::new(slot.postfix_len - 1, 0, *point);
        leaf.add_entry(point);
        slot.insert_child(new_address, Child::Node(leaf));

        let leaf_index = slot.active_children.index_of(new_address);
        slot.children[leaf_index].node_mut()
    }
}

impl<K: PhKey, const D: usize, T> Debug for Node<K, D, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("point", &self.point)
            .field("infix_len", &self.infix_len)
            .field("postfix_len", &self.postfix_len)
            .field("active_children", &self.active_children)
            .field("child_count", &self.children.len())
            .finish()
    }
}
