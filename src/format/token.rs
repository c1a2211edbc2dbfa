//! Passphrase auth token codec.
//!
//! Token layout, all lengths little-endian:
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0      | 4    | algorithm id (u32)       |
//! | 4      | 4    | iv length (u32)          |
//! | 8      | 4    | auth tag length (u32)    |
//! | 12     | 4    | message length (u32)     |
//! | 16     | 4    | kdf context length (u32) |
//! | 20     | ivL  | iv bytes                 |
//! | 20+ivL | tagL | tag bytes                |
//! | ...    | kdfL | kdf context bytes        |
//!
//! KDF context layout:
//!
//! | Offset | Size | Field                |
//! |--------|------|----------------------|
//! | 0      | 4    | iteration count (u32)|
//! | 4      | 4    | salt length (u32)    |
//! | 8      | ..   | salt bytes           |

use crate::error::{Error, Result};

/// Fixed envelope size: algorithm id plus the four length fields.
pub const ENVELOPE_LEN: usize = 20;

/// Serialized size of a KDF context with an empty salt.
pub const KDF_CONTEXT_MIN: usize = 8;

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// PBKDF2 parameters embedded in an auth token.
///
/// A parsed context borrows its salt from the token buffer.
pub struct KdfContext<'a> {
    pub iterations: u32,
    pub salt: &'a [u8],
}

impl<'a> KdfContext<'a> {
    /// Exact serialized size.
    pub fn size(&self) -> usize {
        KDF_CONTEXT_MIN + self.salt.len()
    }

    /// Serializes the context, returning the number of bytes written.
    pub fn write(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.size();
        if buf.len() < size {
            return Err(Error::BufferTooSmall {
                token: size,
                message: 0,
            });
        }

        buf[0..4].copy_from_slice(&self.iterations.to_le_bytes());
        buf[4..8].copy_from_slice(&(self.salt.len() as u32).to_le_bytes());
        buf[KDF_CONTEXT_MIN..size].copy_from_slice(self.salt);

        Ok(size)
    }

    /// Parses a context from its slot in a token.
    ///
    /// The declared salt length must account for the slot exactly.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < KDF_CONTEXT_MIN {
            return Err(Error::CorruptedToken);
        }

        let iterations = read_u32(buf, 0);
        let salt_len = read_u32(buf, 4) as usize;

        if buf.len() - KDF_CONTEXT_MIN != salt_len {
            return Err(Error::CorruptedToken);
        }

        Ok(Self {
            iterations,
            salt: &buf[KDF_CONTEXT_MIN..],
        })
    }
}

/// A passphrase auth token header.
///
/// A parsed token borrows its variable-length fields from the token buffer;
/// nothing is copied.
pub struct AuthToken<'a> {
    pub alg: u32,
    pub iv: &'a [u8],
    pub auth_tag: &'a [u8],
    pub message_len: u32,
    pub kdf_context: &'a [u8],
}

impl<'a> AuthToken<'a> {
    /// Exact serialized size of this token.
    pub fn size(&self) -> usize {
        ENVELOPE_LEN + self.iv.len() + self.auth_tag.len() + self.kdf_context.len()
    }

    /// Serializes the token, returning the number of bytes written.
    ///
    /// The count always equals [`AuthToken::size`].
    pub fn write(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.size();
        if buf.len() < size {
            return Err(Error::BufferTooSmall {
                token: size,
                message: 0,
            });
        }

        buf[0..4].copy_from_slice(&self.alg.to_le_bytes());
        buf[4..8].copy_from_slice(&(self.iv.len() as u32).to_le_bytes());
        buf[8..12].copy_from_slice(&(self.auth_tag.len() as u32).to_le_bytes());
        buf[12..16].copy_from_slice(&self.message_len.to_le_bytes());
        buf[16..20].copy_from_slice(&(self.kdf_context.len() as u32).to_le_bytes());

        let mut offset = ENVELOPE_LEN;
        buf[offset..offset + self.iv.len()].copy_from_slice(self.iv);
        offset += self.iv.len();
        buf[offset..offset + self.auth_tag.len()].copy_from_slice(self.auth_tag);
        offset += self.auth_tag.len();
        buf[offset..offset + self.kdf_context.len()].copy_from_slice(self.kdf_context);
        offset += self.kdf_context.len();

        Ok(offset)
    }

    /// Parses a token, validating its framing.
    ///
    /// The length fields must account for the buffer exactly; both truncated
    /// and padded tokens are refused.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < ENVELOPE_LEN {
            return Err(Error::CorruptedToken);
        }

        let alg = read_u32(buf, 0);
        let iv_len = read_u32(buf, 4) as usize;
        let tag_len = read_u32(buf, 8) as usize;
        let message_len = read_u32(buf, 12);
        let kdf_len = read_u32(buf, 16) as usize;

        let total = ENVELOPE_LEN as u64 + iv_len as u64 + tag_len as u64 + kdf_len as u64;
        if total != buf.len() as u64 {
            return Err(Error::CorruptedToken);
        }

        let mut offset = ENVELOPE_LEN;
        let iv = &buf[offset..offset + iv_len];
        offset += iv_len;
        let auth_tag = &buf[offset..offset + tag_len];
        offset += tag_len;
        let kdf_context = &buf[offset..offset + kdf_len];

        Ok(Self {
            alg,
            iv,
            auth_tag,
            message_len,
            kdf_context,
        })
    }

    /// Declared plaintext length, read without validating the whole token.
    ///
    /// Lets callers size their output buffer before committing to a full
    /// parse and key derivation.
    pub fn message_size(buf: &[u8]) -> Result<u32> {
        if buf.len() < ENVELOPE_LEN {
            return Err(Error::CorruptedToken);
        }

        Ok(read_u32(buf, 12))
    }
}
