use thiserror::Error;

/// Errors returned by encrypt and decrypt operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A required input was missing or malformed at the call boundary.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// An output buffer cannot hold the result.
    ///
    /// This is a recoverable sizing signal, not a failure: `token` and
    /// `message` carry the sizes the caller must provide on retry.
    /// Decryption only sizes the message and reports `token` as zero.
    #[error("buffer too small: {token} token bytes and {message} message bytes required")]
    BufferTooSmall { token: usize, message: usize },

    /// The auth token failed structural validation: bad framing, nonzero
    /// reserved bits, an unsupported KDF selector or key length, or a
    /// ciphertext length that disagrees with the header.
    #[error("corrupted auth token")]
    CorruptedToken,

    /// A cryptographic primitive failed, or authentication did not verify.
    /// A wrong passphrase and tampered data are deliberately
    /// indistinguishable.
    #[error("authenticated encryption failed")]
    Failure,
}

pub type Result<T> = std::result::Result<T, Error>;
