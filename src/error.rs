/// Discriminated result of every fallible operation in this crate.
///
/// Caller errors are surfaced verbatim at the boundary. On any error the
/// caller's output buffer holds nothing meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Internal invariant failure, e.g. an empty divisor.
    Unknown,
    /// The window table of one exponentiation could not be allocated.
    /// Safely retryable.
    OutOfMemory,
    /// Rejected key shape: modulus not 1024/2048 bit, modulus even,
    /// exponent zero, or exponent not below the modulus.
    InvalidKey,
    /// Plaintext longer than the block format admits (block size − 11).
    InputTooLarge,
    /// Malformed input: wrong ciphertext length, value not below the
    /// modulus, bad padding, or an undersized output buffer.
    InvalidInput,
}

/// [`Error`] or success.
pub type Result<T> = core::result::Result<T, Error>;
