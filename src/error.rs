use thiserror::Error;

use crate::Backend;

/// Failure of a cipher operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The tag did not match. The output buffer holds no plaintext.
    #[error("authentication failed")]
    AuthenticationFailure,
}

/// Input rejected before any cipher state was created.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("key must be {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("nonce must be {expected} bytes, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    #[error("ciphertext of {actual} bytes is shorter than the {tag} byte tag")]
    CiphertextTooShort { actual: usize, tag: usize },

    #[error("associated data or message length in bits overflows u64")]
    LengthOverflow,

    #[error("backend {0} is not supported by this CPU")]
    UnsupportedBackend(Backend),
}

impl From<Error> for aead::Error {
    fn from(_: Error) -> Self {
        aead::Error
    }
}
