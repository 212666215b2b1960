use crate::types::{PhKey, Point};

//------------ TreeMapping --------------------------------------------------

/// How a tree turns the caller's domain values into points and elements.
///
/// A mapping is installed when the tree is created and consulted at the
/// public boundary only: `insert`, `find` and `remove` take the caller's
/// index value and run it through [`point_of`](Self::point_of); `insert`
/// additionally runs [`element_of`](Self::element_of) when the point is not
/// occupied yet. The tree never copies or retains index values.
///
/// Implementations typically convert each coordinate with
/// [`IntoPhKey`](crate::types::convert::IntoPhKey) and assemble the result:
///
/// ```
/// use phtree_store::{IntoPhKey, Point, TreeMapping};
///
/// struct Grid;
///
/// impl TreeMapping<u32, 2> for Grid {
///     type Index = (i32, i32);
///     type Element = (i32, i32);
///
///     fn point_of(&self, index: &(i32, i32)) -> Point<u32, 2> {
///         Point::new([index.0.into_ph_key(), index.1.into_ph_key()])
///     }
///
///     fn element_of(&self, index: &(i32, i32)) -> Option<(i32, i32)> {
///         Some(*index)
///     }
/// }
/// ```
pub trait TreeMapping<K: PhKey, const D: usize> {
    /// The caller's domain value, whatever determines the spatial index of
    /// what is being stored.
    type Index: ?Sized;

    /// The element stored per point.
    type Element;

    /// The point an index lives at.
    fn point_of(&self, index: &Self::Index) -> Point<K, D>;

    /// Construct the element for a fresh entry. Returning `None` marks the
    /// entry as failed construction: `insert` reports an error and `find`
    /// reports absence until the point is inserted again or removed.
    fn element_of(&self, index: &Self::Index) -> Option<Self::Element>;

    /// The box-point form of an index, for trees of even dimension that
    /// store boxes as points. A mapping that does not deal in boxes keeps
    /// the default, which makes box queries report a missing converter.
    fn box_point_of(&self, _index: &Self::Index) -> Option<Point<K, D>> {
        None
    }
}
