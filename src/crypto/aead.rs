//! Plain AEAD layer: AES-GCM with a caller-supplied key.
//!
//! The pipelines derive the key themselves, so the algorithm identifier
//! handed to this layer must carry the no-KDF selector; anything else is
//! refused rather than re-derived.

use aes_gcm::{
    aead::{
        generic_array::{
            typenum::{U12, U16},
            GenericArray,
        },
        AeadCore, AeadInPlace, KeyInit,
    },
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm,
};
use getrandom::fill;

use super::{IV_LEN, TAG_LEN};
use crate::error::{Error, Result};
use crate::format::{
    key_bytes, SYM_AES_GCM, SYM_ALG_MASK, SYM_KDF_MASK, SYM_NOKDF, SYM_PADDING_MASK,
};

/// AES-192-GCM; the RustCrypto crate only aliases the 128- and 256-bit
/// variants.
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Fill buffer with cryptographically secure random bytes
pub fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::Failure)
}

fn check_alg(alg: u32, key: &[u8], iv: &[u8]) -> Result<()> {
    if alg & SYM_KDF_MASK != SYM_NOKDF {
        return Err(Error::Failure);
    }
    if alg & SYM_ALG_MASK != SYM_AES_GCM || alg & SYM_PADDING_MASK != 0 {
        return Err(Error::Failure);
    }
    if key_bytes(alg) != key.len() {
        return Err(Error::Failure);
    }
    if iv.len() != IV_LEN {
        return Err(Error::Failure);
    }
    Ok(())
}

/// Encrypts `buf` in place and returns the detached authentication tag.
///
/// `buf` holds the plaintext on entry and the ciphertext on return, so the
/// ciphertext is exactly as long as the message.
pub fn encrypt(
    alg: u32,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    buf: &mut [u8],
) -> Result<[u8; TAG_LEN]> {
    check_alg(alg, key, iv)?;

    let tag = match key.len() {
        16 => seal::<Aes128Gcm>(key, iv, aad, buf)?,
        24 => seal::<Aes192Gcm>(key, iv, aad, buf)?,
        32 => seal::<Aes256Gcm>(key, iv, aad, buf)?,
        _ => return Err(Error::Failure),
    };

    Ok(tag.into())
}

/// Decrypts `buf` in place after verifying the detached tag.
///
/// `buf` is only turned into plaintext once the tag has verified; on failure
/// it still holds the ciphertext.
pub fn decrypt(
    alg: u32,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    buf: &mut [u8],
    tag: &[u8],
) -> Result<()> {
    check_alg(alg, key, iv)?;
    if tag.len() != TAG_LEN {
        return Err(Error::Failure);
    }

    match key.len() {
        16 => open::<Aes128Gcm>(key, iv, aad, buf, tag),
        24 => open::<Aes192Gcm>(key, iv, aad, buf, tag),
        32 => open::<Aes256Gcm>(key, iv, aad, buf, tag),
        _ => Err(Error::Failure),
    }
}

fn seal<C>(key: &[u8], iv: &[u8], aad: &[u8], buf: &mut [u8]) -> Result<GenericArray<u8, U16>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key).map_err(|_| Error::Failure)?;
    cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, buf)
        .map_err(|_| Error::Failure)
}

fn open<C>(key: &[u8], iv: &[u8], aad: &[u8], buf: &mut [u8], tag: &[u8]) -> Result<()>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key).map_err(|_| Error::Failure)?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(iv),
            aad,
            buf,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| Error::Failure)
}
