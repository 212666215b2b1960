pub use crate::types::{IntoPhKey, PhKey, Point, TreeMapping};

pub use crate::ph_tree::query::{BoxMatch, WindowQuery};
pub use crate::ph_tree::PhTree;

pub use crate::types::errors::PhTreeError;
pub use crate::types::stats::TreeStats;
