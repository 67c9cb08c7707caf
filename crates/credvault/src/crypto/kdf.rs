//! scrypt key derivation from a master secret and a per-envelope salt.

use scrypt::{scrypt, Params};
use zeroize::Zeroizing;

use super::{KEY_LEN, SALT_LEN};
use crate::error::CredentialError;
use crate::keys::MasterSecret;

/// log2 of the scrypt cost factor (N = 16384).
pub const LOG_N: u8 = 14;

/// scrypt block size `r`.
pub const BLOCK_SIZE: u32 = 8;

/// scrypt parallelisation `p`.
pub const PARALLELISM: u32 = 1;

/// Derive a [`KEY_LEN`]-byte key on the current thread.
///
/// Deterministic for a given `(secret, salt)`. This takes tens of milliseconds
/// and ~16 MiB of memory; async callers should use [`derive_key`].
///
/// # Errors
///
/// Returns [`CredentialError::KeyDerivation`] if scrypt rejects its parameters.
pub fn derive_key_blocking(
    secret: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>, CredentialError> {
    let params = Params::new(LOG_N, BLOCK_SIZE, PARALLELISM, KEY_LEN)
        .map_err(|e| CredentialError::KeyDerivation(e.to_string()))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt(secret, salt, &params, &mut key[..])
        .map_err(|e| CredentialError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Derive a key on Tokio's blocking pool so request handlers keep running.
///
/// `secret` and `salt` are moved into the worker and zeroed when it finishes,
/// even if the calling future has been dropped in the meantime.
///
/// # Errors
///
/// Returns [`CredentialError::KeyDerivation`] if scrypt fails or the worker
/// task panics or is cancelled.
pub async fn derive_key(
    secret: MasterSecret,
    salt: Zeroizing<[u8; SALT_LEN]>,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CredentialError> {
    tokio::task::spawn_blocking(move || derive_key_blocking(secret.expose().as_bytes(), &salt[..]))
        .await
        .map_err(|e| CredentialError::KeyDerivation(format!("derivation task did not complete: {e}")))?
}
