//! The 32-bit word underlying all big-integer storage.

/// A word of big-integer representation.
pub type Digit = u32;
/// Unsigned type with twice as many bits as [`Digit`].
pub(crate) type DoubleDigit = u64;
/// Signed type with twice as many bits as [`Digit`].
pub(crate) type SignedDoubleDigit = i64;

/// Number of significant bits in a single digit.
pub(crate) fn bit_length(digit: Digit) -> usize {
    (Digit::BITS - digit.leading_zeros()) as usize
}
