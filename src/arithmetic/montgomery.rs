//! Montgomery arithmetic and sliding-window modular exponentiation.
//!
//! Montgomery form represents x modulo an odd n as x·2^(32·L) mod n, for an
//! L-digit modulus. Reduction after a multiply then needs no division: a
//! per-digit multiplier derived from −n⁻¹ mod 2^32 clears the low digits
//! one at a time, and the result is read off the high half. Getting in and
//! out of the form costs one shifted division and one extra reduction,
//! negligible next to a large-exponent power.

use alloc::vec::Vec;

use zeroize::Zeroize;

use crate::digit::{Digit, SignedDoubleDigit};
use crate::numbers::{MutableUnsigned, Unsigned, SCRATCH_CAPACITY};
use crate::{Error, Result};

use super::divide::divide;
use super::multiply::{add_one, mul_add, multiply_to_len, square_to_len};
use super::shift::shifted;
use super::subtract::sub_assign_borrow;

/// Exponent bit lengths up to which each window width pays off.
const WINDOW_THRESHOLDS: [usize; 7] = [7, 25, 81, 241, 673, 1793, usize::MAX];

/// Multiplicative inverse of `value` modulo 2^64; `value` must be odd.
///
/// Newton iteration `t ← t·(2 − value·t)` doubles the correct low bits each
/// round, so five rounds saturate a 64-bit word.
fn inverse_mod64(value: u64) -> u64 {
    debug_assert_eq!(value & 1, 1);
    let mut t = value;
    for _ in 0..5 {
        t = t.wrapping_mul(2u64.wrapping_sub(value.wrapping_mul(t)));
    }
    debug_assert_eq!(t.wrapping_mul(value), 1);
    t
}

/// Montgomery reduction of the double-width value in `n`, in place: divides
/// by 2^(32·mlen) modulo the modulus. The result lands in the high half,
/// `n[..mlen]`.
///
/// `inv` is −modulus⁻¹ mod 2^32. The per-digit pass leaves the value only
/// approximately reduced; the trailing subtractions (a small, bounded
/// number) bring it strictly below the modulus.
fn mont_reduce(n: &mut [Digit], modulus: &[Digit], inv: Digit) {
    let mlen = modulus.len();
    let zlen = n.len();
    debug_assert_eq!(zlen, 2 * mlen);

    let mut c: SignedDoubleDigit = 0;
    for offset in 0..mlen {
        let n_end = n[zlen - 1 - offset];
        let carry = mul_add(n, modulus, offset, inv.wrapping_mul(n_end));
        c += add_one(n, offset, mlen, carry) as SignedDoubleDigit;
    }

    while c > 0 {
        c += sub_assign_borrow(&mut n[..mlen], modulus);
    }

    while &n[..mlen] >= &modulus[..] {
        sub_assign_borrow(&mut n[..mlen], modulus);
    }
}

/// `product = x · y · 2^(−32·mlen) mod modulus`; the value lands in
/// `product[..mlen]`, with `product` twice the modulus width.
fn montgomery_multiply(
    x: &[Digit],
    y: &[Digit],
    modulus: &[Digit],
    inv: Digit,
    product: &mut [Digit],
) {
    multiply_to_len(x, y, product);
    mont_reduce(product, modulus, inv);
}

/// Squaring counterpart of [`montgomery_multiply`].
fn montgomery_square(x: &[Digit], modulus: &[Digit], inv: Digit, product: &mut [Digit]) {
    square_to_len(x, product);
    mont_reduce(product, modulus, inv);
}

/// The 2-slot scratch pool the main loop ping-pongs between. Slot `b_idx`
/// holds the live accumulator; the other slot is the next write target.
fn slots(
    pool: &mut [[Digit; SCRATCH_CAPACITY]; 2],
    b_idx: usize,
) -> (&[Digit], &mut [Digit]) {
    let (first, second) = pool.split_at_mut(1);
    if b_idx == 0 {
        (&first[0][..], &mut second[0][..])
    } else {
        (&second[0][..], &mut first[0][..])
    }
}

/// `out = base^exponent mod modulus`, sliding-window exponentiation over
/// Montgomery arithmetic.
///
/// Requirements: the modulus is odd and at least two digits, the exponent
/// is nonzero. `out` is left at the full modulus width (un-normalized),
/// ready for fixed-width serialization. The base need not be below the
/// modulus; it is reduced here.
///
/// An exponent of exactly 1 short-circuits to a copy of the base.
///
/// The window table is the one heap allocation in this crate; it is wiped
/// and freed on every exit path, and its allocation failure is the only
/// internal error, reported as [`Error::OutOfMemory`].
pub fn mod_pow(
    base: &Unsigned,
    exponent: &Unsigned,
    modulus: &Unsigned,
    out: &mut Unsigned,
) -> Result<()> {
    if exponent.size == 1 && exponent.value[0] == 1 {
        out.clone_from(base);
        return Ok(());
    }

    let mod_len = modulus.size;
    let mod_words = modulus.words();
    let exp_words = exponent.words();
    debug_assert!(mod_len >= 2);
    debug_assert!(modulus.is_odd());
    debug_assert!(exponent.size > 0);

    // The reduction constant: inverse of the low 64 modulus bits, negated.
    // Reduction consumes it one digit at a time, so the low digit is all it
    // keeps.
    let n0 = mod_words[mod_len - 1] as u64 | ((mod_words[mod_len - 2] as u64) << 32);
    let inv = inverse_mod64(n0).wrapping_neg() as Digit;

    // Bring the base into Montgomery form: shift up by the modulus width
    // and reduce. The remainder is both below the modulus and at the digit
    // alignment the reduction expects.
    let mut a2 = MutableUnsigned::new();
    a2.len = shifted(base, mod_len << 5, &mut a2.value);
    a2.normalize();
    let mut b2 = MutableUnsigned::from_unsigned(modulus);
    let mut reduced = MutableUnsigned::new();
    divide(&mut a2, &mut b2, &mut reduced)?;

    // Window width from the exponent bit length. 65537 keeps the minimal
    // window: for 17 bits the table would not pay for itself.
    let ebits_total = exponent.bit_length();
    let mut wbits = 0;
    if !(ebits_total == 17 && exp_words[0] == crate::E) {
        while ebits_total > WINDOW_THRESHOLDS[wbits] {
            wbits += 1;
        }
    }
    debug!("modpow: {} exponent bits, window {}", ebits_total, wbits + 1);

    // The odd powers of the base in Montgomery form, each entry one
    // double-width buffer.
    let table_size = 1usize << wbits;
    let stride = mod_len << 1;
    let mut table: Vec<Digit> = Vec::new();
    table
        .try_reserve_exact(table_size * stride)
        .map_err(|_| Error::OutOfMemory)?;
    table.resize(table_size * stride, 0);

    // entry 0: the reduced base, right-aligned to the modulus width
    let r_len = reduced.len;
    table[mod_len - r_len..mod_len].copy_from_slice(reduced.words());

    let mut pool = [[0 as Digit; SCRATCH_CAPACITY]; 2];
    let mut b_idx = 1;

    // The square of the base seeds the table walk, and doubles as the
    // hoisted first iteration of the main loop when the first multiply
    // position coincides with the top of the exponent.
    montgomery_square(&table[..mod_len], mod_words, inv, &mut pool[b_idx][..stride]);
    for i in 1..table_size {
        let (lower, entry) = table.split_at_mut(i * stride);
        montgomery_multiply(
            &pool[b_idx][..mod_len],
            &lower[(i - 1) * stride..][..mod_len],
            mod_words,
            inv,
            &mut entry[..stride],
        );
    }

    // Preload the window that slides across the exponent, most significant
    // bit first.
    let mut ebits = ebits_total;
    let mut bitpos: Digit = 1 << ((ebits - 1) & 31);
    let mut buf: Digit = 0;
    let mut elen = exponent.size;
    let mut e_index = 0;
    for _ in 0..=wbits {
        buf = (buf << 1) | ((exp_words[e_index] & bitpos != 0) as Digit);
        bitpos >>= 1;
        if bitpos == 0 {
            e_index += 1;
            bitpos = 1 << 31;
            elen -= 1;
        }
    }

    ebits -= 1;
    let tz = buf.trailing_zeros() as usize;
    buf >>= tz;
    let mut multpos = ebits + tz - wbits;
    let mut mult_idx = (buf >> 1) as usize;
    buf = 0;
    let mut isone = multpos != ebits;

    loop {
        ebits -= 1;

        // advance the window by one exponent bit; past the end, zeros
        buf <<= 1;
        if elen != 0 {
            buf |= (exp_words[e_index] & bitpos != 0) as Digit;
            bitpos >>= 1;
            if bitpos == 0 {
                e_index += 1;
                bitpos = 1 << 31;
                elen -= 1;
            }
        }

        // a set top bit fixes the pending multiply: strip the window's
        // trailing zeros to find the odd power and its aligned position
        if buf & table_size as Digit != 0 {
            let tz = buf.trailing_zeros() as usize;
            buf >>= tz;
            multpos = ebits + tz - wbits;
            mult_idx = (buf >> 1) as usize;
            buf = 0;
        }

        // multiply at the aligned position
        if ebits == multpos {
            let mult = &table[mult_idx * stride..][..mod_len];
            if isone {
                pool[b_idx][..mod_len].copy_from_slice(mult);
                isone = false;
            } else {
                let (b, a) = slots(&mut pool, b_idx);
                montgomery_multiply(&b[..mod_len], mult, mod_words, inv, &mut a[..stride]);
                b_idx = 1 - b_idx;
            }
        }

        if ebits == 0 {
            break;
        }

        // square between positions
        if !isone {
            let (b, a) = slots(&mut pool, b_idx);
            montgomery_square(&b[..mod_len], mod_words, inv, &mut a[..stride]);
            b_idx = 1 - b_idx;
        }
    }

    // One final reduction pass converts the accumulator out of Montgomery
    // form: place it in the low half of a double-width buffer and reduce.
    let (b, spare) = slots(&mut pool, b_idx);
    for digit in spare[..mod_len].iter_mut() {
        *digit = 0;
    }
    spare[mod_len..stride].copy_from_slice(&b[..mod_len]);
    mont_reduce(&mut spare[..stride], mod_words, inv);
    out.value[..mod_len].copy_from_slice(&spare[..mod_len]);
    out.size = mod_len;

    for slot in pool.iter_mut() {
        slot[..].zeroize();
    }
    table.as_mut_slice().zeroize();
    a2.zeroize();
    reduced.zeroize();

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn digit_pair_inverse() {
        let candidate = inverse_mod64(crate::E as u64);
        assert_eq!(candidate.wrapping_mul(crate::E as u64), 1);
        assert_eq!(candidate, 18446462603027742721);

        for odd in (65537u64..65537 + 101).step_by(2) {
            let candidate = inverse_mod64(odd);
            assert_eq!(candidate.wrapping_mul(odd), 1);
        }
    }

    fn check_mod_pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) {
        let b = Unsigned::from_be_bytes(&base.to_bytes_be()).unwrap();
        let e = Unsigned::from_be_bytes(&exponent.to_bytes_be()).unwrap();
        let n = Unsigned::from_be_bytes(&modulus.to_bytes_be()).unwrap();

        let mut out = Unsigned::zero();
        mod_pow(&b, &e, &n, &mut out).unwrap();

        let mut bytes = vec![0u8; n.size * 4];
        out.write_be_bytes(n.size, &mut bytes);

        assert_eq!(
            BigUint::from_bytes_be(&bytes),
            base.modpow(exponent, modulus)
        );
    }

    #[test]
    fn matches_reference_small() {
        let n = BigUint::parse_bytes(b"c0ffee1bad1dea77", 16).unwrap();
        let base = BigUint::parse_bytes(b"123456789abcdef0f00d", 16).unwrap();

        // the forced minimal window for 65537
        check_mod_pow(&base, &BigUint::from(crate::E), &n);

        // a 56-bit exponent takes a genuine multi-bit window
        let e = BigUint::parse_bytes(b"deadbeef123457", 16).unwrap();
        check_mod_pow(&base, &e, &n);

        // a three-digit modulus, base larger than the modulus
        let n = BigUint::parse_bytes(b"f1e2d3c4b5a6978801020305", 16).unwrap();
        check_mod_pow(&base, &e, &n);

        // tiny exponents around the short-circuit
        check_mod_pow(&base, &BigUint::from(2u32), &n);
        check_mod_pow(&base, &BigUint::from(3u32), &n);
    }

    #[test]
    fn exponent_one_is_identity() {
        use hex_literal::hex;

        let n = Unsigned::from_be_bytes(&hex!("ffffffffffffffc5")).unwrap();
        let base = Unsigned::from_be_bytes(&hex!("0123456789abcdef")).unwrap();
        let one = Unsigned::from_be_bytes(&[1]).unwrap();

        let mut out = Unsigned::zero();
        mod_pow(&base, &one, &n, &mut out).unwrap();
        assert!(out == base);
    }
}
