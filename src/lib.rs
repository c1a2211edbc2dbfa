//! Passcell - passphrase-based authenticated encryption with self-describing
//! auth tokens.
//!
//! Encrypting a message derives a one-off key from the passphrase with
//! PBKDF2-HMAC-SHA256 and seals the message with AES-256-GCM. The result is
//! split in two: the encrypted message body, and an auth token carrying
//! everything needed to decrypt it again (algorithm, IV, authentication tag,
//! declared message length, and the KDF parameters) except the passphrase
//! itself. An optional context is bound into the authentication tag without
//! being encrypted; decryption must present the same context.
//!
//! # Security
//!
//! A fresh salt and IV are drawn for every encryption, so sealing the same
//! message twice yields unrelated tokens and ciphertexts. Derived keys and
//! the other transient secrets live on the call frame and are wiped on every
//! exit path. Decryption refuses tokens with unknown algorithm bits instead
//! of guessing, and does not reveal whether a failure was a wrong passphrase
//! or tampered data.
//!
//! # Quick Start
//!
//! ```
//! let (token, ciphertext) = passcell::encrypt(b"secret", b"hello", None).unwrap();
//! let message = passcell::decrypt(b"secret", None, &token, &ciphertext).unwrap();
//! assert_eq!(&*message, b"hello");
//! ```
//!
//! # Sizing
//!
//! The `*_into` variants write into caller-owned buffers and follow a
//! two-phase contract: when an output buffer is too small the operation is
//! not performed and [`Error::BufferTooSmall`] reports the required sizes.
//! [`encrypted_sizes`] and [`decrypted_size`] answer the same question up
//! front; probing does nothing and may be repeated freely.

mod crypto;
mod error;
mod format;

pub use crate::error::{Error, Result};

use crate::crypto::{aead, kdf, IV_LEN, MAX_KEY_LEN, SALT_LEN, TAG_LEN};
use crate::format::token::{AuthToken, KdfContext, ENVELOPE_LEN, KDF_CONTEXT_MIN};
use crate::format::{
    key_bytes, reserved_bits_valid, strip_kdf, SYM_128_KEY_LENGTH, SYM_192_KEY_LENGTH,
    SYM_256_KEY_LENGTH, SYM_AES_GCM, SYM_KDF_MASK, SYM_KEY_LENGTH_MASK, SYM_PBKDF2,
};
use zeroize::Zeroizing;

/// Algorithm identifier for newly produced tokens: AES-256-GCM with PBKDF2
/// key derivation. Defaults may change between releases, but decryption
/// keeps supporting every identifier ever produced.
const PASSPHRASE_ALG: u32 = SYM_AES_GCM | SYM_PBKDF2 | SYM_256_KEY_LENGTH;

/// Largest token the default algorithm produces.
const MAX_TOKEN_SIZE: usize = ENVELOPE_LEN + IV_LEN + TAG_LEN + KDF_CONTEXT_MIN + SALT_LEN;

/// Conservative output sizes for encrypting a `message_len`-byte message.
///
/// Returns `(token, ciphertext)` sizes. The token figure is an upper bound
/// for the current default algorithm; the ciphertext figure is exact.
pub fn encrypted_sizes(message_len: usize) -> (usize, usize) {
    (MAX_TOKEN_SIZE, message_len)
}

/// Plaintext size declared by an auth token.
///
/// Reads only the fixed envelope, so a corrupted token body still answers;
/// the full validation happens on decrypt.
pub fn decrypted_size(token: &[u8]) -> Result<usize> {
    if token.is_empty() {
        return Err(Error::InvalidParameter("token must not be empty"));
    }

    Ok(AuthToken::message_size(token)? as usize)
}

/// Encrypts `message` under `passphrase`, returning `(token, ciphertext)`.
///
/// `user_context`, when given, is authenticated but not encrypted and must
/// be presented identically on decrypt.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for an empty passphrase, empty
/// message, or empty non-absent context, and [`Error::Failure`] if a
/// cryptographic primitive fails.
pub fn encrypt(
    passphrase: &[u8],
    message: &[u8],
    user_context: Option<&[u8]>,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let (token_size, message_size) = encrypted_sizes(message.len());
    let mut token = vec![0u8; token_size];
    let mut ciphertext = vec![0u8; message_size];

    let (token_len, ciphertext_len) = encrypt_into(
        passphrase,
        message,
        user_context,
        &mut token,
        &mut ciphertext,
    )?;

    token.truncate(token_len);
    ciphertext.truncate(ciphertext_len);
    Ok((token, ciphertext))
}

/// Decrypts a sealed message, returning the plaintext.
///
/// The plaintext is wiped when dropped.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for empty required inputs,
/// [`Error::CorruptedToken`] if the token fails validation, and
/// [`Error::Failure`] if authentication does not verify.
pub fn decrypt(
    passphrase: &[u8],
    user_context: Option<&[u8]>,
    token: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let mut message = Zeroizing::new(vec![0u8; decrypted_size(token)?]);

    let message_len = decrypt_into(passphrase, user_context, token, ciphertext, &mut message)?;

    message.truncate(message_len);
    Ok(message)
}

/// Encrypts `message` into caller-owned buffers.
///
/// On success returns the number of bytes written to `token_out` and
/// `message_out`. If either buffer is too small, nothing is done and
/// [`Error::BufferTooSmall`] reports the required sizes; probing with empty
/// buffers is the intended way to discover them.
pub fn encrypt_into(
    passphrase: &[u8],
    message: &[u8],
    user_context: Option<&[u8]>,
    token_out: &mut [u8],
    message_out: &mut [u8],
) -> Result<(usize, usize)> {
    if passphrase.is_empty() {
        return Err(Error::InvalidParameter("passphrase must not be empty"));
    }
    if message.is_empty() {
        return Err(Error::InvalidParameter("message must not be empty"));
    }
    if message.len() > u32::MAX as usize {
        return Err(Error::InvalidParameter(
            "message does not fit the 32-bit length field",
        ));
    }
    if let Some(context) = user_context {
        if context.is_empty() {
            return Err(Error::InvalidParameter(
                "context must not be empty when present",
            ));
        }
    }

    if token_out.len() < MAX_TOKEN_SIZE || message_out.len() < message.len() {
        return Err(Error::BufferTooSmall {
            token: MAX_TOKEN_SIZE,
            message: message.len(),
        });
    }

    let key_len = key_bytes(PASSPHRASE_ALG);

    let mut salt = Zeroizing::new([0u8; SALT_LEN]);
    aead::secure_random(&mut salt[..])?;

    let mut derived_key = Zeroizing::new([0u8; MAX_KEY_LEN]);
    kdf::derive_key(
        passphrase,
        &salt[..],
        kdf::PBKDF2_ITERATIONS,
        &mut derived_key[..key_len],
    )?;

    let mut iv = Zeroizing::new([0u8; IV_LEN]);
    aead::secure_random(&mut iv[..])?;

    // The AEAD works in place: the output buffer receives the plaintext and
    // leaves holding a ciphertext of exactly the message length.
    let ciphertext = &mut message_out[..message.len()];
    ciphertext.copy_from_slice(message);
    let tag: Zeroizing<[u8; TAG_LEN]> = Zeroizing::new(aead::encrypt(
        strip_kdf(PASSPHRASE_ALG),
        &derived_key[..key_len],
        &iv[..],
        user_context.unwrap_or_default(),
        ciphertext,
    )?);

    let kdf_context = KdfContext {
        iterations: kdf::PBKDF2_ITERATIONS,
        salt: &salt[..],
    };
    let mut kdf_buf = Zeroizing::new([0u8; KDF_CONTEXT_MIN + SALT_LEN]);
    kdf_context.write(&mut kdf_buf[..])?;

    let header = AuthToken {
        alg: PASSPHRASE_ALG,
        iv: &iv[..],
        auth_tag: &tag[..],
        message_len: message.len() as u32,
        kdf_context: &kdf_buf[..],
    };
    if token_out.len() < header.size() {
        return Err(Error::BufferTooSmall {
            token: header.size(),
            message: message.len(),
        });
    }
    let token_len = header.write(token_out)?;

    Ok((token_len, message.len()))
}

/// Decrypts a sealed message into a caller-owned buffer.
///
/// On success returns the number of bytes written to `message_out`. If the
/// buffer is smaller than the length the token declares, nothing is done
/// and [`Error::BufferTooSmall`] reports it; `ciphertext` may be left empty
/// while probing.
pub fn decrypt_into(
    passphrase: &[u8],
    user_context: Option<&[u8]>,
    token: &[u8],
    ciphertext: &[u8],
    message_out: &mut [u8],
) -> Result<usize> {
    if passphrase.is_empty() {
        return Err(Error::InvalidParameter("passphrase must not be empty"));
    }
    if let Some(context) = user_context {
        if context.is_empty() {
            return Err(Error::InvalidParameter(
                "context must not be empty when present",
            ));
        }
    }
    if token.is_empty() {
        return Err(Error::InvalidParameter("token must not be empty"));
    }

    // Quick guess from the envelope, without parsing the token deeply.
    let expected_len = AuthToken::message_size(token)? as usize;
    if message_out.len() < expected_len {
        return Err(Error::BufferTooSmall {
            token: 0,
            message: expected_len,
        });
    }

    if ciphertext.is_empty() {
        return Err(Error::InvalidParameter("ciphertext must not be empty"));
    }

    let header = AuthToken::parse(token)?;

    if !reserved_bits_valid(header.alg) {
        return Err(Error::CorruptedToken);
    }
    match header.alg & SYM_KDF_MASK {
        SYM_PBKDF2 => {}
        // The no-KDF selector belongs to the key-mode API and must never
        // appear in a passphrase token.
        _ => return Err(Error::CorruptedToken),
    }
    match header.alg & SYM_KEY_LENGTH_MASK {
        SYM_128_KEY_LENGTH | SYM_192_KEY_LENGTH | SYM_256_KEY_LENGTH => {}
        _ => return Err(Error::CorruptedToken),
    }
    let key_len = key_bytes(header.alg);
    if header.message_len as usize != ciphertext.len() {
        return Err(Error::CorruptedToken);
    }

    let kdf_context = KdfContext::parse(header.kdf_context)?;

    // Sized for the largest supported key; shorter keys use a prefix.
    let mut derived_key = Zeroizing::new([0u8; MAX_KEY_LEN]);
    kdf::derive_key(
        passphrase,
        kdf_context.salt,
        kdf_context.iterations,
        &mut derived_key[..key_len],
    )?;

    let message = &mut message_out[..ciphertext.len()];
    message.copy_from_slice(ciphertext);
    aead::decrypt(
        strip_kdf(header.alg),
        &derived_key[..key_len],
        header.iv,
        user_context.unwrap_or_default(),
        message,
        header.auth_tag,
    )?;

    Ok(message.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    // --------------------------------------------------
    // PARAMETER VALIDATION
    // --------------------------------------------------

    #[test]
    fn encrypt_rejects_empty_passphrase() {
        assert!(matches!(
            encrypt(b"", b"hello", None),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn encrypt_rejects_empty_message() {
        assert!(matches!(
            encrypt(b"secret", b"", None),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn encrypt_rejects_empty_context() {
        assert!(matches!(
            encrypt(b"secret", b"hello", Some(b"")),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn decrypt_rejects_empty_inputs() {
        let (token, ciphertext) = encrypt(b"secret", b"hello", None).unwrap();

        assert!(matches!(
            decrypt(b"", None, &token, &ciphertext),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            decrypt(b"secret", Some(b""), &token, &ciphertext),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            decrypt(b"secret", None, b"", &ciphertext),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            decrypt(b"secret", None, &token, b""),
            Err(Error::InvalidParameter(_))
        ));
    }

    // --------------------------------------------------
    // SIZING CONTRACT
    // --------------------------------------------------

    #[test]
    fn encrypt_into_reports_required_sizes() {
        let (token_req, message_req) =
            match encrypt_into(b"secret", b"hello", None, &mut [], &mut []) {
                Err(Error::BufferTooSmall { token, message }) => (token, message),
                other => panic!("expected a sizing signal, got {other:?}"),
            };

        assert_eq!(message_req, 5);

        // A retry with exactly the reported sizes succeeds and never
        // consumes more than reported.
        let mut token_buf = vec![0u8; token_req];
        let mut ciphertext_buf = vec![0u8; message_req];
        let (token_len, ciphertext_len) = encrypt_into(
            b"secret",
            b"hello",
            None,
            &mut token_buf,
            &mut ciphertext_buf,
        )
        .unwrap();

        assert!(token_len <= token_req);
        assert_eq!(ciphertext_len, 5);
    }

    #[test]
    fn decrypt_into_reports_required_size() {
        let (token, ciphertext) = encrypt(b"secret", b"hello", None).unwrap();

        // Probe without a ciphertext, as a caller sizing its buffer would.
        let err = decrypt_into(b"secret", None, &token, b"", &mut []);
        assert_eq!(
            err,
            Err(Error::BufferTooSmall {
                token: 0,
                message: 5
            })
        );

        let mut message = vec![0u8; 5];
        let n = decrypt_into(b"secret", None, &token, &ciphertext, &mut message).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&message, b"hello");
    }

    #[test]
    fn probes_are_idempotent() {
        let (token, _) = encrypt(b"secret", b"hello", None).unwrap();

        assert_eq!(encrypted_sizes(5), encrypted_sizes(5));
        assert_eq!(
            decrypted_size(&token).unwrap(),
            decrypted_size(&token).unwrap()
        );
        assert_eq!(decrypted_size(&token).unwrap(), 5);
    }

    #[test]
    fn oversized_buffers_are_fine() {
        let (token, ciphertext) = encrypt(b"secret", b"hello", None).unwrap();

        let mut message = vec![0xFFu8; 64];
        let n = decrypt_into(b"secret", None, &token, &ciphertext, &mut message).unwrap();
        assert_eq!(&message[..n], b"hello");
    }

    // --------------------------------------------------
    // PIPELINES
    // --------------------------------------------------

    #[test]
    fn roundtrip_with_context() {
        let (token, ciphertext) = encrypt(b"secret", b"hello", Some(b"ctx")).unwrap();
        let message = decrypt(b"secret", Some(b"ctx"), &token, &ciphertext).unwrap();

        assert_eq!(&*message, b"hello");
    }

    #[test]
    fn token_has_the_advertised_size() {
        let (token, ciphertext) = encrypt(b"secret", b"hello", None).unwrap();

        assert_eq!(token.len(), encrypted_sizes(5).0);
        assert_eq!(ciphertext.len(), 5);
    }

    #[test]
    fn binary_messages_roundtrip() {
        let message: Vec<u8> = (0..=255).collect();

        let (token, ciphertext) = encrypt(b"pw", &message, None).unwrap();
        let decrypted = decrypt(b"pw", None, &token, &ciphertext).unwrap();

        assert_eq!(&*decrypted, &message);
    }
}
