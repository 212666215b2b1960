use std::fmt;

/// Possible errors returned by methods on a tree
#[derive(Debug, PartialEq, Eq)]
pub enum PhTreeError {
    /// The mapping's element constructor declined to produce an element.
    /// The entry remains at its point without an element; looking the point
    /// up behaves as if it were absent. Inserting the point again retries
    /// construction, removing it releases the entry.
    ElementCreationFailed,
    /// A box query was requested on a tree whose mapping has no box-point
    /// converter.
    BoxConverterMissing,
    /// A box query was requested on a tree with an odd number of
    /// dimensions. Boxes of N dimensions live in trees of 2N dimensions.
    UnevenDimensions,
}

impl std::error::Error for PhTreeError {}

impl fmt::Display for PhTreeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PhTreeError::ElementCreationFailed => {
                write!(
                    f,
                    "Error: The element for the inserted point could not \
                    be created."
                )
            }
            PhTreeError::BoxConverterMissing => {
                write!(
                    f,
                    "Error: The tree's mapping does not provide a box-point \
                    converter."
                )
            }
            PhTreeError::UnevenDimensions => {
                write!(
                    f,
                    "Error: Box queries require a tree with an even number \
                    of dimensions."
                )
            }
        }
    }
}
