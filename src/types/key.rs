use std::fmt::{Binary, Debug, Display};
use std::hash::Hash;

use num_traits::{CheckedShl, CheckedShr, PrimInt, Unsigned};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

//------------ PhKey (trait) ------------------------------------------------

/// The unsigned key type of a tree as a Trait.
///
/// The idea of this trait is that each bit width will have a separate type
/// so a tree only takes the amount of memory its coordinates actually need.
/// All ordering, masking and addressing inside the tree operates on the raw
/// bits of this type; converting domain values (signed integers, floats)
/// into keys is the job of [`IntoPhKey`](crate::types::convert::IntoPhKey).
pub trait PhKey:
    PrimInt
    + Unsigned
    + CheckedShl
    + CheckedShr
    + Binary
    + Debug
    + Display
    + Hash
    + FromBytes
    + IntoBytes
    + Immutable
    + KnownLayout
    + 'static
{
    /// The number of bits in the key, which is also the depth of a tree
    /// keyed on it.
    const BITS: u32;

    /// Widen to the machine word all bit-counting funnels through, the same
    /// way the XOR reduction always runs 64-bit regardless of key width.
    fn into_u64(self) -> u64;

    /// The bit at `position`, counted from the least significant end.
    fn bit(self, position: u32) -> bool {
        (self >> position as usize) & Self::one() == Self::one()
    }

    // You can't shift with the number of bits of the key type, so these
    // return zero for that case instead. Shift amounts inside the engine
    // legitimately reach `BITS` (the root covers the whole key space).
    fn shl_or_zero(self, rhs: u32) -> Self {
        self.checked_shl(rhs).unwrap_or_else(<Self as num_traits::Zero>::zero)
    }

    fn shr_or_zero(self, rhs: u32) -> Self {
        self.checked_shr(rhs).unwrap_or_else(<Self as num_traits::Zero>::zero)
    }

    /// Mask selecting every bit above `postfix_len`, i.e. the prefix a node
    /// at that height fixes for all of its descendants.
    fn prefix_mask(postfix_len: u32) -> Self {
        Self::max_value().shl_or_zero(postfix_len + 1)
    }
}

macro_rules! impl_ph_key {
    ( $( $ty:ty ),* ) => {
        $(
            impl PhKey for $ty {
                const BITS: u32 = <$ty>::BITS;

                fn into_u64(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_ph_key!(u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_saturation() {
        assert_eq!(u8::MAX.shl_or_zero(8), 0);
        assert_eq!(u8::MAX.shl_or_zero(7), 0x80);
        assert_eq!(u32::MAX.shr_or_zero(32), 0);
        assert_eq!(u64::prefix_mask(63), 0);
        assert_eq!(u64::prefix_mask(0), u64::MAX - 1);
        assert_eq!(u8::prefix_mask(2), 0b1111_1000);
    }

    #[test]
    fn test_bit() {
        assert!(0b0100_u32.bit(2));
        assert!(!0b0100_u32.bit(3));
        assert!(u64::MAX.bit(63));
    }
}
