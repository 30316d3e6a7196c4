//! RSA keys as raw big-endian byte material.
//!
//! No ASN.1 here: a key is the pair (exponent, modulus) plus which half of
//! the keypair it is. The kind picks the padding style and the tag the
//! other half expects to find after its transform.

use rand_core::{CryptoRng, RngCore};

use crate::numbers::Unsigned;
use crate::{Error, Result};

/// Digits in a 1024-bit modulus.
const RSA_1K_DIGITS: usize = 1024 / 32;
/// Digits in a 2048-bit modulus.
const RSA_2K_DIGITS: usize = 2048 / 32;

/// Which half of a keypair a key is. Doubles as the block type tag of the
/// padding this key produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Private = 1,
    Public = 2,
}

impl KeyKind {
    pub(crate) fn tag(self) -> u8 {
        self as u8
    }

    pub(crate) fn opposite(self) -> Self {
        match self {
            KeyKind::Private => KeyKind::Public,
            KeyKind::Public => KeyKind::Private,
        }
    }
}

/// An RSA key over borrowed big-endian bytes. Only 1024- and 2048-bit
/// moduli are accepted; validation happens on use, not construction.
#[derive(Clone, Copy)]
pub struct RsaKey<'a> {
    pub exponent: &'a [u8],
    pub modulus: &'a [u8],
    pub kind: KeyKind,
}

impl<'a> RsaKey<'a> {
    pub fn new(exponent: &'a [u8], modulus: &'a [u8], kind: KeyKind) -> Self {
        Self {
            exponent,
            modulus,
            kind,
        }
    }

    /// Encrypt `input` (or, with a private key, produce a raw signature
    /// block over it). Writes one block to `output`, returns its length.
    pub fn encrypt(
        &self,
        input: &[u8],
        rng: impl CryptoRng + RngCore,
        output: &mut [u8],
    ) -> Result<usize> {
        crate::crypt::encrypt(input, self, rng, output)
    }

    /// Decrypt one block (or, with a public key, recover a signed
    /// payload from it). Returns the payload length written to `output`.
    pub fn decrypt(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        crate::crypt::decrypt(input, self, output)
    }

    /// Parse and check the key material: modulus of exactly 32 or 64
    /// digits and odd, exponent nonzero and strictly below the modulus.
    pub(crate) fn validate(&self) -> Result<(Unsigned, Unsigned)> {
        let exponent = Unsigned::from_be_bytes(self.exponent).map_err(|_| Error::InvalidKey)?;
        let modulus = Unsigned::from_be_bytes(self.modulus).map_err(|_| Error::InvalidKey)?;

        let mod_len = modulus.size;
        if (mod_len != RSA_1K_DIGITS && mod_len != RSA_2K_DIGITS)
            || !modulus.is_odd()
            || exponent.size == 0
            || exponent >= modulus
        {
            warn!("rejecting key: bad shape");
            return Err(Error::InvalidKey);
        }
        Ok((exponent, modulus))
    }
}
