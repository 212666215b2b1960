use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::types::PhKey;

//------------ Point --------------------------------------------------------

/// An index point in a tree: an ordered tuple of `D` keys.
///
/// Points are the sole indexable identity, there is at most one element per
/// point. The wrapper is `repr(transparent)` over `[K; D]` so a point can be
/// viewed as raw bytes, e.g. for hashing or dumping batches of coordinates.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    FromBytes,
    IntoBytes,
    Immutable,
    KnownLayout,
)]
#[repr(transparent)]
pub struct Point<K: PhKey, const D: usize>(pub [K; D]);

// `serde`'s built-in array support only covers fixed lengths up to 32, so
// a generic `const D: usize` field can't use `#[derive(Serialize)]`. This
// mirrors exactly what that derive would emit (a newtype struct wrapping
// the array serialized element-by-element as a tuple).
impl<K: PhKey + Serialize, const D: usize> Serialize for Point<K, D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        struct ArrayAsTuple<'a, K, const D: usize>(&'a [K; D]);

        impl<K: Serialize, const D: usize> Serialize for ArrayAsTuple<'_, K, D> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                let mut tup = serializer.serialize_tuple(D)?;
                for value in self.0 {
                    tup.serialize_element(value)?;
                }
                tup.end()
            }
        }

        serializer.serialize_newtype_struct("Point", &ArrayAsTuple(&self.0))
    }
}

impl<K: PhKey, const D: usize> Point<K, D> {
    pub fn new(values: [K; D]) -> Self {
        Point(values)
    }

    /// The origin, all dimensions zero.
    pub fn zero() -> Self {
        Point([<K as num_traits::Zero>::zero(); D])
    }

    pub fn values(&self) -> &[K; D] {
        &self.0
    }

    /// Pack a half-dimensional point into its box-point form, repeating the
    /// coordinates into both the min and the max half: in a 4-d tree that
    /// stores 2-d boxes, the 2-d point (1, 2) becomes (1, 2, 1, 2).
    ///
    /// # Panics
    ///
    /// Panics if `H` is not half of `D`.
    pub fn box_repeat<const H: usize>(half: [K; H]) -> Self {
        assert!(H * 2 == D, "box points need twice the box dimensions");

        let mut values = [<K as num_traits::Zero>::zero(); D];
        values[..H].copy_from_slice(&half);
        values[H..].copy_from_slice(&half);
        Point(values)
    }

    /// _All_ of this point's dimensions must be greater than or equal to
    /// `other`'s dimensions for the point to be greater than or equal.
    pub(crate) fn all_ge(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// _All_ of this point's dimensions must be less than or equal to
    /// `other`'s dimensions for the point to be less than or equal.
    pub(crate) fn all_le(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a <= b)
    }

    /// Compare only the bits above `postfix_len`, per dimension.
    pub(crate) fn prefix_eq(&self, other: &Self, postfix_len: u32) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            a.shr_or_zero(postfix_len + 1) == b.shr_or_zero(postfix_len + 1)
        })
    }

    pub(crate) fn prefix_ge(&self, other: &Self, postfix_len: u32) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            a.shr_or_zero(postfix_len + 1) >= b.shr_or_zero(postfix_len + 1)
        })
    }

    pub(crate) fn prefix_le(&self, other: &Self, postfix_len: u32) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            a.shr_or_zero(postfix_len + 1) <= b.shr_or_zero(postfix_len + 1)
        })
    }

    /// The number of bits over which two points diverge, i.e. one past the
    /// position of the highest differing bit over all dimensions. Returns 0
    /// for equal points.
    pub(crate) fn diverging_bits(&self, other: &Self) -> u32 {
        let mut difference = 0_u64;

        for dimension in 0..D {
            difference |=
                (self.0[dimension] ^ other.0[dimension]).into_u64();
        }

        // the reduction always runs over the widest key width, so count
        // down from 64 regardless of K
        64 - difference.leading_zeros()
    }

    /// The hypercube address of this point at a node with the given postfix
    /// length: bit `postfix_len` of dimension 0 ends up as the MSB of the
    /// address, dimension D - 1 as the LSB.
    pub(crate) fn address_at(&self, postfix_len: u32) -> u32 {
        let mut address = 0;

        for dimension in 0..D {
            address <<= 1;
            address |= self.0[dimension].bit(postfix_len) as u32;
        }

        address
    }

    /// Clamp this point onto the center of the subspace a node with the
    /// given postfix length covers: postfix bits forced to zero, the bit at
    /// `postfix_len` forced to one. Window queries rely on node points
    /// being centered like this.
    pub(crate) fn centered(mut self, postfix_len: u32) -> Self {
        let mask = K::prefix_mask(postfix_len);

        for value in self.0.iter_mut() {
            *value = (*value & mask) | (K::one() << postfix_len as usize);
        }

        self
    }
}

impl<K: PhKey, const D: usize> From<[K; D]> for Point<K, D> {
    fn from(values: [K; D]) -> Self {
        Point(values)
    }
}

impl<K: PhKey, const D: usize> fmt::Display for Point<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (dimension, value) in self.0.iter().enumerate() {
            if dimension > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_compare() {
        let a = Point::<u32, 2>::new([0b1010_0000, 0b0110_0000]);
        let b = Point::<u32, 2>::new([0b1010_1111, 0b0110_1111]);

        assert!(a.prefix_eq(&b, 4));
        // bit 3 differs, so it shows up once the prefix reaches down to it
        assert!(!a.prefix_eq(&b, 2));
        // shifting out the entire key compares empty prefixes
        assert!(a.prefix_eq(&b, 31));
    }

    #[test]
    fn test_diverging_bits() {
        let a = Point::<u32, 2>::new([0b1010, 0b0001]);
        let b = Point::<u32, 2>::new([0b1010, 0b0000]);

        assert_eq!(a.diverging_bits(&b), 1);
        assert_eq!(a.diverging_bits(&a), 0);

        let c = Point::<u32, 2>::new([0b1010_0000, 0b0001]);
        assert_eq!(a.diverging_bits(&c), 8);
    }

    #[test]
    fn test_address() {
        // postfix_len 2: dimension 0 contributes the MSB
        let p = Point::<u8, 3>::new([0b100, 0b000, 0b100]);
        assert_eq!(p.address_at(2), 0b101);
        assert_eq!(p.address_at(1), 0b000);
    }

    #[test]
    fn test_centered() {
        let p = Point::<u8, 2>::new([0b1011_0110, 0b0100_1101]);
        let c = p.centered(3);
        assert_eq!(c.values(), &[0b1011_1000, 0b0100_1000]);

        // the root center in an 8 bit tree is 1000_0000 everywhere
        let root = Point::<u8, 2>::zero().centered(7);
        assert_eq!(root.values(), &[0x80, 0x80]);
    }

    #[test]
    fn test_box_repeat() {
        let p = Point::<u32, 6>::box_repeat([1, 2, 3]);
        assert_eq!(p.values(), &[1, 2, 3, 1, 2, 3]);
    }
}
