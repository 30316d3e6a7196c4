//! The legacy encryption block: `00 ‖ BT ‖ PS ‖ 00 ‖ DATA`.
//!
//! BT is the block type tag: 1 when the producing key is private, 2 when
//! it is public. A private-style padding string is all 0xFF; a public-style
//! one is random with every zero byte displaced, since 0x00 is the block's
//! own separator. At least eight padding bytes are required, which is where
//! the block-size-minus-eleven data limit comes from.

use rand_core::{CryptoRng, RngCore};

use crate::key::KeyKind;
use crate::{Error, Result};

/// Format overhead: two header bytes, eight padding bytes minimum, one
/// separator.
pub(crate) const PAD_OVERHEAD: usize = 11;

/// Fewest bytes the separator scan accepts in front of the payload.
const MIN_SEPARATOR_INDEX: usize = 10;

/// Replace every zero byte of the padding string with a nonzero value
/// derived from its position and neighbours, so the only zero before the
/// payload is the separator itself. The fallback for a zero derivation is
/// position-independent but never zero.
pub(crate) fn remove_zero(a: &mut [u8]) {
    let size = a.len();
    for i in 0..size {
        if a[i] != 0 {
            continue;
        }
        let mut x = (i ^ size) as u8;
        if i > 0 {
            x ^= a[i - 1];
        }
        if i + 1 < size {
            x ^= a[i + 1];
        }
        a[i] = if x != 0 {
            x
        } else if size < 0xff {
            size as u8
        } else {
            1
        };
    }
}

/// Build the padded block head for `data_len` payload bytes; the caller
/// copies the payload into the tail. `block` is exactly the block size.
pub(crate) fn pad(
    block: &mut [u8],
    data_len: usize,
    kind: KeyKind,
    mut rng: impl CryptoRng + RngCore,
) {
    let padding_len = block.len() - data_len - 3;
    block[0] = 0;
    block[1] = kind.tag();
    match kind {
        KeyKind::Private => {
            for byte in block[2..2 + padding_len].iter_mut() {
                *byte = 0xff;
            }
        }
        KeyKind::Public => {
            rng.fill_bytes(&mut block[2..2 + padding_len]);
            remove_zero(&mut block[2..2 + padding_len]);
        }
    }
    block[2 + padding_len] = 0;
}

/// Validate a transformed block against the padding the *other* half of
/// the keypair produces, returning the payload offset.
///
/// Decrypting with a private key expects the public-style tag and vice
/// versa. This duality is what makes the same pair of operations serve
/// both encryption and raw signatures.
pub(crate) fn unpad(block: &[u8], kind: KeyKind) -> Result<usize> {
    let block_size = block.len();
    let expected = kind.opposite();
    if block[0] != 0 || block[1] != expected.tag() {
        return Err(Error::InvalidInput);
    }

    let mut separator = 2;
    while separator < block_size && block[separator] != 0 {
        separator += 1;
    }
    if separator < MIN_SEPARATOR_INDEX || separator == block_size {
        return Err(Error::InvalidInput);
    }

    if expected == KeyKind::Private && !block[2..separator].iter().all(|&b| b == 0xff) {
        return Err(Error::InvalidInput);
    }

    Ok(separator + 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::CountingRng;

    #[test]
    fn remove_zero_leaves_no_zeros() {
        let mut a = [0u8; 64];
        remove_zero(&mut a);
        assert!(a.iter().all(|&b| b != 0));

        // zeros scattered between nonzero neighbours
        let mut a = [0u8, 7, 0, 0, 255, 0, 1, 0];
        remove_zero(&mut a);
        assert!(a.iter().all(|&b| b != 0));
    }

    #[test]
    fn public_block_shape() {
        let mut block = [0xaau8; 128];
        // a counting source seeded to wrap through zero, so the
        // displacement path is exercised
        pad(&mut block, 20, KeyKind::Public, CountingRng(250));

        assert_eq!(block[0], 0);
        assert_eq!(block[1], 2);
        let padding_len = 128 - 20 - 3;
        assert!(block[2..2 + padding_len].iter().all(|&b| b != 0));
        assert_eq!(block[2 + padding_len], 0);
    }

    #[test]
    fn private_block_shape() {
        let mut block = [0xaau8; 128];
        pad(&mut block, 32, KeyKind::Private, CountingRng(0));

        assert_eq!(&block[..2], &[0, 1]);
        assert!(block[2..128 - 33].iter().all(|&b| b == 0xff));
        assert_eq!(block[128 - 33], 0);
    }

    #[test]
    fn unpad_round_trip() {
        let mut block = [0u8; 128];
        pad(&mut block, 20, KeyKind::Public, CountingRng(1));
        block[108..].copy_from_slice(&[0x5a; 20]);

        // a public-style block is what private-key decryption expects
        assert_eq!(unpad(&block, KeyKind::Private), Ok(108));
    }

    #[test]
    fn unpad_rejections() {
        let mut block = [0u8; 128];
        pad(&mut block, 20, KeyKind::Private, CountingRng(0));

        // same-half tag: a private-key transform cannot reveal
        // private-style padding
        assert_eq!(unpad(&block, KeyKind::Private), Err(Error::InvalidInput));
        assert_eq!(unpad(&block, KeyKind::Public), Ok(108));

        // bent filler byte under the 0xFF rule
        let mut broken = block;
        broken[5] = 0xfe;
        assert_eq!(unpad(&broken, KeyKind::Public), Err(Error::InvalidInput));

        // separator too early
        let mut early = block;
        early[7] = 0;
        assert_eq!(unpad(&early, KeyKind::Public), Err(Error::InvalidInput));

        // no separator at all
        let solid = [0xffu8; 128];
        let mut solid = solid;
        solid[0] = 0;
        solid[1] = 1;
        assert_eq!(unpad(&solid, KeyKind::Public), Err(Error::InvalidInput));

        // bad header
        let mut bad = block;
        bad[0] = 1;
        assert_eq!(unpad(&bad, KeyKind::Public), Err(Error::InvalidInput));
    }
}
