use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::{Error, Result};

/// PBKDF2 iteration count for newly produced tokens.
///
/// Only governs encryption; decryption honors whatever count the token
/// declares.
pub const PBKDF2_ITERATIONS: u32 = 200_000;

/// Derives `key.len()` bytes of key material from a passphrase with
/// PBKDF2-HMAC-SHA256.
///
/// On decrypt the salt and iteration count come from the token and are used
/// verbatim.
pub fn derive_key(passphrase: &[u8], salt: &[u8], iterations: u32, key: &mut [u8]) -> Result<()> {
    if iterations == 0 {
        return Err(Error::Failure);
    }

    pbkdf2_hmac::<Sha256>(passphrase, salt, iterations, key);
    Ok(())
}
