//! Fixed-capacity big integers, most significant digit first.
//!
//! Two representations, matching their roles: [`Unsigned`] is the
//! normalized operand handed between components, [`MutableUnsigned`] is the
//! windowed workhorse of division, where leading digits must be dropped
//! without copying.

use core::cmp::Ordering;

use zeroize::Zeroize;

use crate::digit::{bit_length, Digit};
use crate::{Error, Result};

/// Digits reserved for a key-sized integer: 64 for the largest supported
/// modulus, plus headroom for shifted intermediates.
pub(crate) const KEY_CAPACITY: usize = 68;

/// Scratch capacity, covering double-width products and widened dividends.
pub(crate) const SCRATCH_CAPACITY: usize = KEY_CAPACITY * 2;

/// Unsigned integer of up to [`KEY_CAPACITY`] digits, most significant
/// digit first.
///
/// `value[..size]` is the magnitude. In normal form there is no leading
/// zero digit and `size == 0` encodes zero. The one deliberate exception:
/// [`mod_pow`][crate::mod_pow] leaves its result at the full modulus width,
/// ready for fixed-width serialization.
#[derive(Clone, Debug)]
pub struct Unsigned {
    pub(crate) value: [Digit; KEY_CAPACITY],
    pub(crate) size: usize,
}

impl Unsigned {
    pub fn zero() -> Self {
        Self {
            value: [0; KEY_CAPACITY],
            size: 0,
        }
    }

    /// Parse big-endian bytes, stripping leading zero bytes and packing
    /// four bytes to a digit; the highest digit keeps whatever remains.
    ///
    /// Fails only when the significant bytes outgrow the capacity.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let keep = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let digits = (bytes.len() - keep + 3) / 4;
        if digits > KEY_CAPACITY {
            return Err(Error::InvalidInput);
        }

        let mut out = Self::zero();
        out.size = digits;
        let mut b = bytes.len();
        for i in (0..digits).rev() {
            let take = core::cmp::min(4, b - keep);
            let mut digit: Digit = 0;
            for &byte in &bytes[b - take..b] {
                digit = (digit << 8) | byte as Digit;
            }
            out.value[i] = digit;
            b -= take;
        }
        Ok(out)
    }

    /// Serialize as exactly `width` digits of big-endian bytes, left-padded
    /// with zeros: block formats depend on the block size, not on the
    /// numeric magnitude.
    pub fn write_be_bytes(&self, width: usize, out: &mut [u8]) {
        debug_assert!(self.size <= width);
        debug_assert!(out.len() >= width * 4);
        let pad = width - self.size;
        for byte in out[..pad * 4].iter_mut() {
            *byte = 0;
        }
        for (i, &digit) in self.words().iter().enumerate() {
            out[(pad + i) * 4..][..4].copy_from_slice(&digit.to_be_bytes());
        }
    }

    pub(crate) fn words(&self) -> &[Digit] {
        &self.value[..self.size]
    }

    pub fn bit_length(&self) -> usize {
        if self.size == 0 {
            0
        } else {
            ((self.size - 1) << 5) + bit_length(self.value[0])
        }
    }

    /// The lowest digit decides; zero is even.
    pub fn is_odd(&self) -> bool {
        self.size > 0 && self.value[self.size - 1] & 1 == 1
    }
}

/// Comparisons assume normal form: the digit count decides, equal counts
/// compare lexicographically from the top digit.
impl PartialEq for Unsigned {
    fn eq(&self, other: &Self) -> bool {
        self.words() == other.words()
    }
}

impl Eq for Unsigned {}

impl PartialOrd for Unsigned {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Unsigned {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| self.words().cmp(other.words()))
    }
}

impl Zeroize for Unsigned {
    fn zeroize(&mut self) {
        self.value[..].zeroize();
        self.size = 0;
    }
}

/// Mutable big integer over fixed scratch storage, with an explicit
/// `(offset, len)` window so leading digits can be dropped without copying.
///
/// `value[offset..offset + len]` is the magnitude, most significant digit
/// first. Normal form: `value[offset] != 0`, or `len == 0`. Division leaves
/// its remainder un-normalized mid-algorithm; every public exit point
/// restores normal form. Windows never escape the owning call.
pub(crate) struct MutableUnsigned {
    pub(crate) value: [Digit; SCRATCH_CAPACITY],
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl MutableUnsigned {
    pub(crate) fn new() -> Self {
        Self {
            value: [0; SCRATCH_CAPACITY],
            offset: 0,
            len: 0,
        }
    }

    pub(crate) fn from_unsigned(source: &Unsigned) -> Self {
        let mut out = Self::new();
        out.value[..source.size].copy_from_slice(source.words());
        out.len = source.size;
        out
    }

    pub(crate) fn words(&self) -> &[Digit] {
        &self.value[self.offset..self.offset + self.len]
    }

    /// Drop leading zero digits, collapsing offset and length.
    pub(crate) fn normalize(&mut self) {
        if self.len == 0 {
            self.offset = 0;
            return;
        }
        let mut index = self.offset;
        if self.value[index] != 0 {
            return;
        }
        let bound = index + self.len;
        while index < bound && self.value[index] == 0 {
            index += 1;
        }
        let zeros = index - self.offset;
        self.len -= zeros;
        self.offset = if self.len == 0 { 0 } else { self.offset + zeros };
    }

    /// Slide the window back to the start of the buffer.
    pub(crate) fn compact(&mut self) {
        if self.offset != 0 {
            self.value.copy_within(self.offset..self.offset + self.len, 0);
            self.offset = 0;
        }
    }

    pub(crate) fn copy_from(&mut self, source: &MutableUnsigned) {
        self.value[..source.len].copy_from_slice(source.words());
        self.len = source.len;
        self.offset = 0;
    }

    pub(crate) fn cmp_magnitude(&self, other: &MutableUnsigned) -> Ordering {
        self.len
            .cmp(&other.len)
            .then_with(|| self.words().cmp(other.words()))
    }

    /// Index of the lowest set bit, `None` for zero.
    pub(crate) fn lowest_set_bit(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let words = self.words();
        let mut j = self.len - 1;
        while j > 0 && words[j] == 0 {
            j -= 1;
        }
        let low = words[j];
        if low == 0 {
            return None;
        }
        Some(((self.len - 1 - j) << 5) + low.trailing_zeros() as usize)
    }
}

impl Zeroize for MutableUnsigned {
    fn zeroize(&mut self) {
        self.value[..].zeroize();
        self.offset = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn from_bytes_strips_leading_zeros() {
        let x = Unsigned::from_be_bytes(&hex!("00000102030405")).unwrap();
        assert_eq!(x.words(), &[0x01, 0x02030405]);
        assert_eq!(x.bit_length(), 33);

        let zero = Unsigned::from_be_bytes(&hex!("000000")).unwrap();
        assert_eq!(zero.size, 0);
        assert_eq!(zero.bit_length(), 0);
        assert!(!zero.is_odd());
    }

    #[test]
    fn from_bytes_partial_high_digit() {
        let x = Unsigned::from_be_bytes(&hex!("0102030405060708090a")).unwrap();
        assert_eq!(x.words(), &[0x0102, 0x03040506, 0x0708090a]);
    }

    #[test]
    fn serialization_pads_to_width() {
        let x = Unsigned::from_be_bytes(&hex!("beef")).unwrap();
        let mut out = [0xffu8; 12];
        x.write_be_bytes(3, &mut out);
        assert_eq!(out, hex!("00000000000000000000beef"));
    }

    #[test]
    fn ordering() {
        let small = Unsigned::from_be_bytes(&hex!("ffffffff")).unwrap();
        let large = Unsigned::from_be_bytes(&hex!("0100000000")).unwrap();
        assert!(small < large);
        assert!(large > small);
        assert_eq!(small, small.clone());
    }

    #[test]
    fn normalize_and_window() {
        let mut m = MutableUnsigned::new();
        m.value[..5].copy_from_slice(&[0, 0, 7, 0, 1]);
        m.len = 5;
        m.normalize();
        assert_eq!(m.offset, 2);
        assert_eq!(m.words(), &[7, 0, 1]);

        m.compact();
        assert_eq!(m.offset, 0);
        assert_eq!(m.words(), &[7, 0, 1]);
    }

    #[test]
    fn lowest_set_bit() {
        let mut m = MutableUnsigned::new();
        m.value[..3].copy_from_slice(&[1, 0, 0]);
        m.len = 3;
        assert_eq!(m.lowest_set_bit(), Some(64));

        m.value[2] = 0x10;
        assert_eq!(m.lowest_set_bit(), Some(4));

        let zero = MutableUnsigned::new();
        assert_eq!(zero.lowest_set_bit(), None);
    }
}
