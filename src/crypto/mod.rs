//! Cryptographic primitives for sealing and opening messages.
//!
//! Provides passphrase key derivation and the plain AEAD layer.

pub mod aead;
pub mod kdf;

/// Length of the AEAD IV (12 bytes for AES-GCM).
pub const IV_LEN: usize = 12;
/// Length of the authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of the PBKDF2 salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the largest supported key (32 bytes / 256 bits).
pub const MAX_KEY_LEN: usize = 32;
