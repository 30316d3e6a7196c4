//! Long division, Knuth TAOCP vol 2 section 4.3.1 Algorithm D.
//!
//! Only the remainder is produced (all that modular reduction needs), so
//! quotient digits are estimated, applied and discarded. One-word
//! divisors take a direct long-division fast path, and operands sharing
//! enough trailing zero bits have the common power of two cancelled first.

use core::cmp::Ordering;

use crate::digit::{Digit, DoubleDigit};
use crate::numbers::{MutableUnsigned, SCRATCH_CAPACITY};
use crate::{Error, Result};

use super::shift::primitive_left_shift;

/// Operand length (digits) below which cancelling powers of two is not
/// worth the shifts.
const POW2_THRESH_LEN: usize = 6;
/// Shared trailing zero digits required before cancelling pays off.
const POW2_THRESH_ZEROS: usize = 3;

/// `remainder = a mod b`.
///
/// `a` and `b` are reshaped (compacted, shifted down) when the
/// power-of-two fast path takes them; their values are not otherwise
/// changed.
pub(crate) fn divide(
    a: &mut MutableUnsigned,
    b: &mut MutableUnsigned,
    remainder: &mut MutableUnsigned,
) -> Result<()> {
    if b.len == 0 {
        return Err(Error::Unknown);
    }

    if a.len == 0 {
        remainder.len = 0;
        remainder.offset = 0;
        return Ok(());
    }

    match a.cmp_magnitude(b) {
        Ordering::Less => {
            remainder.copy_from(a);
            return Ok(());
        }
        Ordering::Equal => {
            remainder.len = 0;
            remainder.offset = 0;
            return Ok(());
        }
        Ordering::Greater => {}
    }

    if b.len == 1 {
        let r = rem_digit(a, b.words()[0]);
        remainder.offset = 0;
        if r == 0 {
            remainder.len = 0;
        } else {
            remainder.len = 1;
            remainder.value[0] = r;
        }
        return Ok(());
    }

    // Cancel a shared power of two when both operands carry enough of one.
    if a.len >= POW2_THRESH_LEN {
        let trailing = match (a.lowest_set_bit(), b.lowest_set_bit()) {
            (Some(x), Some(y)) => x.min(y),
            _ => 0,
        };
        if trailing >= POW2_THRESH_ZEROS * 32 {
            a.compact();
            b.compact();
            a.shift_right(trailing);
            b.shift_right(trailing);
            divide(a, b, remainder)?;
            remainder.shift_left(trailing)?;
            return Ok(());
        }
    }

    if a.len + 2 > SCRATCH_CAPACITY {
        return Err(Error::Unknown);
    }
    divide_magnitude(a, b, remainder);
    Ok(())
}

/// Remainder of an n-digit dividend by a single digit.
fn rem_digit(a: &MutableUnsigned, divisor: Digit) -> Digit {
    let divisor = divisor as DoubleDigit;
    let mut rem: DoubleDigit = 0;
    for &word in a.words() {
        rem = ((rem << 32) | word as DoubleDigit) % divisor;
    }
    rem as Digit
}

/// `q[offset..] -= divisor * x` across the divisor's width (step D4);
/// returns the borrow out of the top.
fn mul_sub(q: &mut [Digit], divisor: &[Digit], x: Digit, offset: usize) -> Digit {
    let x = x as DoubleDigit;
    let mut carry: DoubleDigit = 0;
    let mut pos = offset + divisor.len();

    for j in (0..divisor.len()).rev() {
        let product = divisor[j] as DoubleDigit * x + carry;
        let difference = (q[pos] as DoubleDigit).wrapping_sub(product);
        q[pos] = difference as Digit;
        pos -= 1;
        carry = (product >> 32)
            + if (difference as Digit) > !(product as Digit) {
                1
            } else {
                0
            };
    }
    carry as Digit
}

/// `result[offset..] += divisor` across the divisor's width (step D6, the
/// add-back after an overdrawn estimate); returns the carry.
fn div_add(divisor: &[Digit], result: &mut [Digit], offset: usize) -> Digit {
    let mut carry: DoubleDigit = 0;
    for j in (0..divisor.len()).rev() {
        let sum = divisor[j] as DoubleDigit + result[j + offset] as DoubleDigit + carry;
        result[j + offset] = sum as Digit;
        carry = sum >> 32;
    }
    carry as Digit
}

/// The general case. Requires `a > div` and a divisor of at least two
/// digits, both normalized.
fn divide_magnitude(a: &MutableUnsigned, div: &MutableUnsigned, rem: &mut MutableUnsigned) {
    debug_assert!(div.len >= 2);

    // D1: normalize the divisor so its top bit is set, tracking the shift
    // to undo on the remainder afterwards.
    let shift = div.words()[0].leading_zeros() as usize;
    let dlen = div.len;
    let mut divisor = [0 as Digit; SCRATCH_CAPACITY];
    let dwords = &mut divisor[..dlen];
    dwords.copy_from_slice(div.words());
    if shift > 0 {
        primitive_left_shift(dwords, shift);
    }

    // The remainder starts as the shifted dividend with a zero digit
    // prepended; it stays un-normalized until D8.
    let alen = a.len;
    let grows = shift > 0 && (a.words()[0].leading_zeros() as usize) < shift;
    let rlen = if grows { alen + 1 } else { alen };
    if grows {
        rem.value[1] = 0;
        rem.value[2..2 + alen].copy_from_slice(a.words());
        primitive_left_shift(&mut rem.value[1..2 + alen], shift);
    } else {
        rem.value[1..1 + alen].copy_from_slice(a.words());
        if shift > 0 {
            primitive_left_shift(&mut rem.value[1..1 + alen], shift);
        }
    }
    rem.value[0] = 0;
    rem.offset = 0;
    rem.len = rlen + 1;

    let limit = rlen - dlen + 1;
    let dh = dwords[0];
    let dh_long = dh as DoubleDigit;
    let dl = dwords[1];

    // D2..D7: one discarded quotient digit per position.
    for j in 0..limit {
        // D3: estimate qhat from the top two divisor digits and the top
        // three remainder digits.
        let nh = rem.value[j];
        let nm = rem.value[j + 1];

        let mut qhat: Digit;
        let qrem: Digit;
        let mut skip_correction = false;

        if nh == dh {
            // estimate would overflow a digit: saturate and test below
            qhat = !0;
            qrem = nh.wrapping_add(nm);
            skip_correction = qrem < nh;
        } else {
            let chunk = ((nh as DoubleDigit) << 32) | nm as DoubleDigit;
            qhat = (chunk / dh_long) as Digit;
            qrem = (chunk - qhat as DoubleDigit * dh_long) as Digit;
        }

        if qhat == 0 {
            continue;
        }

        if !skip_correction {
            // walk the estimate down against the next divisor digit
            let nl = rem.value[j + 2] as DoubleDigit;
            let mut rs = ((qrem as DoubleDigit) << 32) | nl;
            let mut est_product = dl as DoubleDigit * qhat as DoubleDigit;

            if est_product > rs {
                qhat -= 1;
                let qrem = (qrem as DoubleDigit + dh_long) as Digit;
                if qrem as DoubleDigit >= dh_long {
                    est_product -= dl as DoubleDigit;
                    rs = ((qrem as DoubleDigit) << 32) | nl;
                    if est_product > rs {
                        qhat -= 1;
                    }
                }
            }
        }

        // D4: multiply and subtract.
        rem.value[j] = 0;
        let borrow = mul_sub(&mut rem.value, dwords, qhat, j);

        // D5/D6: the estimate overdrew by one; add the divisor back. The
        // quotient digit would be decremented here, were it kept.
        if borrow > nh {
            div_add(dwords, &mut rem.value, j + 1);
        }
    }

    // D8: undo the normalization and renormalize.
    if shift > 0 {
        rem.shift_right(shift);
    }
    rem.normalize();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::numbers::Unsigned;
    use num_bigint::BigUint;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn mutable(n: &BigUint) -> MutableUnsigned {
        let bytes = n.to_bytes_be();
        MutableUnsigned::from_unsigned(&Unsigned::from_be_bytes(&bytes).unwrap())
    }

    fn retrieve(m: &MutableUnsigned) -> BigUint {
        let mut bytes = Vec::new();
        for &digit in m.words() {
            bytes.extend_from_slice(&digit.to_be_bytes());
        }
        BigUint::from_bytes_be(&bytes)
    }

    fn check_remainder(a: &BigUint, b: &BigUint) {
        let expected = a % b;
        let mut a = mutable(a);
        let mut b = mutable(b);
        let mut remainder = MutableUnsigned::new();
        divide(&mut a, &mut b, &mut remainder).unwrap();
        assert_eq!(retrieve(&remainder), expected);
    }

    #[test]
    fn empty_divisor_is_rejected() {
        let mut a = mutable(&BigUint::from(17u32));
        let mut b = MutableUnsigned::new();
        let mut remainder = MutableUnsigned::new();
        assert_eq!(
            divide(&mut a, &mut b, &mut remainder),
            Err(Error::Unknown)
        );
    }

    #[test]
    fn trivial_magnitudes() {
        // dividend below divisor: the remainder is the dividend
        check_remainder(&BigUint::from(5u32), &(BigUint::from(7u32) << 64));
        // equal: empty remainder
        let n = BigUint::parse_bytes(b"123456789abcdef0123456789", 16).unwrap();
        check_remainder(&n, &n);
        // zero dividend
        check_remainder(&BigUint::from(0u32), &n);
    }

    #[test]
    fn normalization_shift_is_undone() {
        // two-digit divisor with 31 leading zero bits: exercises the
        // collapse of the emptied top digit after D8
        let a = (BigUint::from(2u32) << 32) + 5u32;
        let b = BigUint::from(1u32) << 32;
        check_remainder(&a, &b);
    }

    #[test]
    fn saturated_estimate() {
        // the first digit estimate corrects down to zero, leaving the top
        // dividend digit equal to the divisor's top digit at the second
        // position: the all-ones qhat sentinel path
        let a = BigUint::parse_bytes(b"800000010000000500000009", 16).unwrap();
        let b = BigUint::parse_bytes(b"80000001ffffffff", 16).unwrap();
        check_remainder(&a, &b);
    }

    proptest! {
        #[test]
        fn matches_reference(
            a in vec(any::<u8>(), 0..256),
            b in vec(any::<u8>(), 1..130),
        ) {
            let a = BigUint::from_bytes_be(&a);
            let b = BigUint::from_bytes_be(&b) + 1u32;
            check_remainder(&a, &b);
        }

        #[test]
        fn matches_reference_single_digit(
            a in vec(any::<u8>(), 0..256),
            d in 1..=u32::MAX,
        ) {
            let a = BigUint::from_bytes_be(&a);
            check_remainder(&a, &BigUint::from(d));
        }

        #[test]
        fn matches_reference_shared_trailing_zeros(
            a in vec(any::<u8>(), 1..120),
            b in vec(any::<u8>(), 1..60),
            extra in 0u32..64,
        ) {
            // both operands carry >= 96 trailing zero bits, taking the
            // power-of-two cancellation path
            let a = (BigUint::from_bytes_be(&a) + 1u32) << (96 + extra as usize);
            let b = (BigUint::from_bytes_be(&b) + 1u32) << 96;
            check_remainder(&a, &b);
        }
    }
}
