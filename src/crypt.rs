//! Request orchestration: validate, pad, transform, serialize, unpad.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::arithmetic::mod_pow;
use crate::key::RsaKey;
use crate::numbers::Unsigned;
use crate::padding::{pad, unpad, PAD_OVERHEAD};
use crate::{Error, Result};

/// Largest supported block in bytes (a 2048-bit modulus).
const MAX_BLOCK_SIZE: usize = 256;

/// Transform direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// The boundary operation: run one RSA block transform of `input` under
/// `key` into `output`, returning the number of bytes written.
///
/// Encrypting pads `input` (at most block size − 11 bytes) into one block;
/// decrypting consumes exactly one block and strips the padding the other
/// half of the keypair applied. On any error the contents of `output` are
/// unspecified. The RNG feeds public-style padding only; decryption never
/// draws from it.
pub fn crypt(
    input: &[u8],
    key: &RsaKey<'_>,
    mode: Mode,
    rng: impl CryptoRng + RngCore,
    output: &mut [u8],
) -> Result<usize> {
    match mode {
        Mode::Encrypt => encrypt(input, key, rng, output),
        Mode::Decrypt => decrypt(input, key, output),
    }
}

/// The shared tail of both directions: range-check the block integer, run
/// the power, keep the result at full width.
fn transform(base: &Unsigned, exponent: &Unsigned, modulus: &Unsigned) -> Result<Unsigned> {
    if base >= modulus {
        return Err(Error::InvalidInput);
    }
    let mut out = Unsigned::zero();
    mod_pow(base, exponent, modulus, &mut out)?;
    Ok(out)
}

pub(crate) fn encrypt(
    input: &[u8],
    key: &RsaKey<'_>,
    rng: impl CryptoRng + RngCore,
    output: &mut [u8],
) -> Result<usize> {
    let (exponent, modulus) = key.validate()?;
    let block_size = modulus.size << 2;

    if input.len() > block_size - PAD_OVERHEAD {
        return Err(Error::InputTooLarge);
    }
    if output.len() < block_size {
        return Err(Error::InvalidInput);
    }

    let mut block = [0u8; MAX_BLOCK_SIZE];
    pad(&mut block[..block_size], input.len(), key.kind, rng);
    block[block_size - input.len()..block_size].copy_from_slice(input);

    let mut base = Unsigned::from_be_bytes(&block[..block_size])?;
    let outcome = transform(&base, &exponent, &modulus);
    base.zeroize();
    block[..].zeroize();

    let result = outcome?;
    result.write_be_bytes(modulus.size, &mut output[..block_size]);
    Ok(block_size)
}

pub(crate) fn decrypt(input: &[u8], key: &RsaKey<'_>, output: &mut [u8]) -> Result<usize> {
    let (exponent, modulus) = key.validate()?;
    let block_size = modulus.size << 2;

    if input.len() != block_size {
        return Err(Error::InvalidInput);
    }
    if output.len() < block_size {
        return Err(Error::InvalidInput);
    }

    let base = Unsigned::from_be_bytes(input)?;
    let mut result = transform(&base, &exponent, &modulus)?;

    let mut block = [0u8; MAX_BLOCK_SIZE];
    result.write_be_bytes(modulus.size, &mut block[..block_size]);
    result.zeroize();

    let payload = match unpad(&block[..block_size], key.kind) {
        Ok(start) => {
            let length = block_size - start;
            output[..length].copy_from_slice(&block[start..block_size]);
            Ok(length)
        }
        Err(error) => Err(error),
    };
    block[..].zeroize();
    payload
}
