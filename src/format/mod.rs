//! Binary format of passphrase auth tokens.
//!
//! Provides the algorithm-identifier bit fields and the token codec.
//!
//! The algorithm identifier is a packed 32-bit value with four disjoint
//! fields. Every bit outside those fields is reserved and must be zero, so
//! tokens produced by a future format revision are refused by older code
//! rather than silently misread.

pub mod token;

/// Symmetric algorithm selector bits.
pub const SYM_ALG_MASK: u32 = 0xF000_0000;
/// AES in GCM mode.
pub const SYM_AES_GCM: u32 = 0x4000_0000;

/// Key derivation selector bits.
pub const SYM_KDF_MASK: u32 = 0x0F00_0000;
/// No key derivation: the caller supplies the final key.
pub const SYM_NOKDF: u32 = 0x0000_0000;
/// PBKDF2-HMAC-SHA256 key derivation.
pub const SYM_PBKDF2: u32 = 0x0100_0000;

/// Padding selector bits.
pub const SYM_PADDING_MASK: u32 = 0x000F_0000;

/// Key length bits, storing the length in bits verbatim.
pub const SYM_KEY_LENGTH_MASK: u32 = 0x0000_0FFF;
/// 128-bit key.
pub const SYM_128_KEY_LENGTH: u32 = 128;
/// 192-bit key.
pub const SYM_192_KEY_LENGTH: u32 = 192;
/// 256-bit key.
pub const SYM_256_KEY_LENGTH: u32 = 256;

/// Clears the KDF selector, marking the key as already derived.
///
/// The pipelines run the KDF themselves; the identifier handed to the plain
/// AEAD layer must say so, or the layer would be entitled to re-derive.
pub fn strip_kdf(alg: u32) -> u32 {
    (alg & !SYM_KDF_MASK) | SYM_NOKDF
}

/// Key length in bytes encoded in `alg`.
pub fn key_bytes(alg: u32) -> usize {
    ((alg & SYM_KEY_LENGTH_MASK) / 8) as usize
}

/// `true` iff `alg` sets no bits outside the four recognized fields.
pub fn reserved_bits_valid(alg: u32) -> bool {
    const USED_BITS: u32 =
        SYM_ALG_MASK | SYM_KDF_MASK | SYM_PADDING_MASK | SYM_KEY_LENGTH_MASK;
    alg & !USED_BITS == 0
}
