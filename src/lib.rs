//! A multidimensional spatial index over integer-keyed points.
//!
//! The tree maps points of `D` unsigned keys (`D` from 1 through 6, key
//! widths of 8 through 64 bits) to caller-supplied elements and answers
//! exact lookups, axis-aligned window queries and, for trees of even
//! dimension, containment and intersection queries over boxes stored as
//! points. See [`PhTree`] for the API and [`TreeMapping`] for how domain
//! values are turned into points.

pub use crate::ph_tree::iterators::Iter;
pub use crate::ph_tree::query::{BoxMatch, WindowQuery};
pub use crate::ph_tree::PhTree;
pub use crate::types::errors::PhTreeError;
pub use crate::types::stats::TreeStats;
pub use crate::types::{IntoPhKey, PhKey, Point, TreeMapping};

pub mod ph_tree;
pub mod prelude;
pub mod types;
