//! Raw RSA transform primitives for 1024- and 2048-bit keys.
//!
//! This crate implements the classic public-key transform, modular
//! exponentiation under either half of a keypair, together with the legacy
//! block padding (`00 ‖ BT ‖ PS ‖ 00 ‖ DATA`). Encrypting with a public key
//! and decrypting with the private key round-trips a message; running the
//! same two operations with the key roles swapped yields the raw
//! sign/verify duality.
//!
//! Underneath sits a from-scratch big-integer engine tuned for fixed key
//! sizes: multi-word schoolbook arithmetic, Knuth Algorithm D division
//! (remainder only), Montgomery multiplication and sliding-window
//! exponentiation. All scratch storage is fixed-capacity and lives on the
//! stack; the single heap allocation is the window table of one
//! exponentiation, released on every exit path.
//!
//! Keys are raw big-endian byte strings (exponent, modulus): no ASN.1, no
//! key files. Only 1024- and 2048-bit moduli are accepted.
//!
//! This implementation is *not* constant time: division, window selection
//! and padding scans all branch on the data they process.
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate delog;
generate_macros!();

mod arithmetic;
mod crypt;
mod digit;
mod error;
mod key;
mod numbers;
mod padding;


pub use arithmetic::mod_pow;
pub use crypt::{crypt, Mode};
pub use digit::Digit;
pub use error::{Error, Result};
pub use key::{KeyKind, RsaKey};
pub use numbers::Unsigned;

/// F4, the fourth Fermat prime `2^16 + 1`, the customary public exponent.
///
/// Any exponent below the modulus is accepted; this one is special-cased in
/// [`mod_pow`], where a 17-bit exponent makes the window table not worth
/// its precomputation.
pub const E: Digit = 0x1_0001;
