use log::trace;
use serde_derive::Serialize;

use crate::ph_tree::node::Node;
use crate::ph_tree::PhTree;
use crate::types::errors::PhTreeError;
use crate::types::{PhKey, Point, TreeMapping};

//------------ WindowQuery / BoxMatch ---------------------------------------

/// An axis-aligned query window.
///
/// A window delivers every stored point `p` with `min_d <= p_d <= max_d`
/// in all dimensions. Bounds are held normalised: construction swaps any
/// dimension whose minimum exceeds its maximum.
///
/// Windows are built through the tree so the bounds pass through its
/// mapping: see [`PhTree::query_window`], [`PhTree::query_box`] and
/// [`PhTree::query_box_point`]. A window stays valid across mutations of
/// the tree and can be run any number of times with
/// [`PhTree::query`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WindowQuery<K: PhKey, const D: usize> {
    min: Point<K, D>,
    max: Point<K, D>,
}

impl<K: PhKey, const D: usize> WindowQuery<K, D> {
    /// Build a window from two corner points, swapping inverted bounds
    /// per dimension.
    pub fn from_points(min: Point<K, D>, max: Point<K, D>) -> Self {
        let mut query = WindowQuery { min, max };

        for dimension in 0..D {
            if query.max.0[dimension] < query.min.0[dimension] {
                let bound = query.min.0[dimension];
                query.min.0[dimension] = query.max.0[dimension];
                query.max.0[dimension] = bound;
            }
        }

        query
    }

    pub fn min(&self) -> &Point<K, D> {
        &self.min
    }

    pub fn max(&self) -> &Point<K, D> {
        &self.max
    }

    /// Reset both bounds to the origin. The resulting window matches only
    /// a point at the origin until fresh bounds are set.
    pub fn clear(&mut self) {
        self.min = Point::zero();
        self.max = Point::zero();
    }

    fn contains(&self, point: &Point<K, D>) -> bool {
        point.all_ge(&self.min) && point.all_le(&self.max)
    }
}

/// How a box query treats boxes that are only partially inside the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoxMatch {
    /// Deliver only boxes entirely contained in the query box.
    Containment,
    /// Also deliver boxes that merely overlap the query box.
    Intersection,
}

impl std::fmt::Display for BoxMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BoxMatch::Containment => write!(f, "containment"),
            BoxMatch::Intersection => write!(f, "intersection"),
        }
    }
}

//------------ Window queries on the tree -----------------------------------

impl<K: PhKey, const D: usize, M: TreeMapping<K, D>> PhTree<K, D, M> {
    /// Build a window from two corner indexes, converted through the
    /// tree's mapping. Inverted bounds are swapped per dimension.
    pub fn query_window(
        &self,
        min: &M::Index,
        max: &M::Index,
    ) -> WindowQuery<K, D> {
        WindowQuery::from_points(
            self.mapping().point_of(min),
            self.mapping().point_of(max),
        )
    }

    /// Build a window that matches boxes stored as points, in a tree of
    /// even dimension.
    ///
    /// With [`BoxMatch::Containment`] the window delivers exactly the
    /// boxes that lie entirely inside the query box. For
    /// [`BoxMatch::Intersection`] the min half of the window is widened to
    /// the bottom of the key space and the max half to the top, which
    /// turns the containment test into "stored min below the query max and
    /// stored max above the query min", i.e. overlap.
    pub fn query_box(
        &self,
        box_match: BoxMatch,
        min: &M::Index,
        max: &M::Index,
    ) -> Result<WindowQuery<K, D>, PhTreeError> {
        if D % 2 != 0 {
            return Err(PhTreeError::UnevenDimensions);
        }

        let mut min = self
            .mapping()
            .box_point_of(min)
            .ok_or(PhTreeError::BoxConverterMissing)?;
        let mut max = self
            .mapping()
            .box_point_of(max)
            .ok_or(PhTreeError::BoxConverterMissing)?;

        if box_match == BoxMatch::Intersection {
            for dimension in 0..D / 2 {
                min.0[dimension] = <K as num_traits::Zero>::zero();
            }
            for dimension in D / 2..D {
                max.0[dimension] = K::max_value();
            }
        }

        Ok(WindowQuery::from_points(min, max))
    }

    /// Build a window that matches all boxes containing a single point:
    /// the intersection query for a zero-extent box.
    pub fn query_box_point(
        &self,
        point: &M::Index,
    ) -> Result<WindowQuery<K, D>, PhTreeError> {
        self.query_box(BoxMatch::Intersection, point, point)
    }

    /// Run a window query, applying `op` to every element whose point is
    /// inside the window. Elements are delivered in trie order; the tree
    /// must not be mutated from inside the closure, which the borrow
    /// checker enforces.
    pub fn query<F: FnMut(&M::Element)>(
        &self,
        window: &WindowQuery<K, D>,
        mut op: F,
    ) {
        for child in &self.root.children {
            query_node(child.node(), window, &mut op);
        }
    }
}

// The traversal. Two layers of pruning keep it off subtrees that cannot
// match:
//
// The coarse check compares the node's prefix bits against the window
// bounds; a prefix outside the window in any dimension rules out every
// descendant.
//
// The child filter masks prune single children without touching their
// memory. Bit d of mask_lower is set when the window minimum is at or
// above the node center in dimension d (so children on the low side of
// that dimension cannot match), mask_upper likewise for the maximum. The
// node point being the center of its subspace is what makes the two >=
// comparisons sufficient. An address survives when
// (address | mask_lower) & mask_upper == address.
fn query_node<K: PhKey, const D: usize, T>(
    node: &Node<K, D, T>,
    window: &WindowQuery<K, D>,
    op: &mut impl FnMut(&T),
) {
    if !node.point.prefix_ge(&window.min, node.postfix_len)
        || !node.point.prefix_le(&window.max, node.postfix_len)
    {
        trace!("prune subtree at {}", node.point);
        return;
    }

    let mut mask_lower: u32 = 0;
    let mut mask_upper: u32 = 0;

    for dimension in 0..D {
        mask_lower <<= 1;
        mask_lower |=
            (window.min.0[dimension] >= node.point.0[dimension]) as u32;

        mask_upper <<= 1;
        mask_upper |=
            (window.max.0[dimension] >= node.point.0[dimension]) as u32;
    }

    if node.is_leaf() {
        for address in 0..Node::<K, D, T>::CHILD_MAX {
            if !node.active_children.is_active(address)
                || (address | mask_lower) & mask_upper != address
            {
                continue;
            }

            let entry = node.children
                [node.active_children.index_of(address)]
            .entry();
            if window.contains(&entry.point) {
                if let Some(element) = entry.element.as_ref() {
                    op(element);
                }
            }
        }
        return;
    }

    for address in 0..Node::<K, D, T>::CHILD_MAX {
        if node.active_children.is_active(address)
            && (address | mask_lower) & mask_upper == address
        {
            let index = node.active_children.index_of(address);
            query_node(node.children[index].node(), window, op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_swaps_inverted_bounds() {
        let query = WindowQuery::from_points(
            Point::<u32, 2>::new([10, 1]),
            Point::<u32, 2>::new([2, 5]),
        );

        assert_eq!(query.min(), &Point::new([2, 1]));
        assert_eq!(query.max(), &Point::new([10, 5]));
    }

    #[test]
    fn test_clear_resets_bounds() {
        let mut query = WindowQuery::from_points(
            Point::<u32, 2>::new([1, 1]),
            Point::<u32, 2>::new([5, 5]),
        );
        query.clear();

        assert_eq!(query.min(), &Point::zero());
        assert_eq!(query.max(), &Point::zero());
        assert!(query.contains(&Point::zero()));
        assert!(!query.contains(&Point::new([0, 1])));
    }
}
