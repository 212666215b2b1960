//------------ Types for Statistics -----------------------------------------

use std::fmt::{self, Debug, Display};

use serde_derive::Serialize;

/// A snapshot of the shape of a tree, gathered by a full walk.
///
/// The root is not counted: a tree that holds no entries reports all
/// counts as zero.
#[derive(Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct TreeStats {
    /// Nodes with undecided bits below them (excluding the root).
    pub inner_nodes: usize,
    /// Nodes at the bottom of the trie, holding entries.
    pub leaf_nodes: usize,
    /// Entries, one per stored point.
    pub entries: usize,
    /// The deepest node level below the root.
    pub max_depth: u32,
    /// In-memory size of a single node.
    pub node_size: usize,
}

impl TreeStats {
    pub fn node_count(&self) -> usize {
        self.inner_nodes + self.leaf_nodes
    }

    pub fn mem_usage(&self) -> usize {
        self.node_count() * self.node_size
    }
}

impl Debug for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {:>8?} ({} inner, {} leaf), entries: {}, depth: {} \
            ({}k)",
            self.node_count(),
            self.inner_nodes,
            self.leaf_nodes,
            self.entries,
            self.max_depth,
            self.mem_usage() / 1024
        )
    }
}

impl Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
