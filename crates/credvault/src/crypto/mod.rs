//! scrypt + AES-256-GCM primitives and the envelope format.
//!
//! This module knows nothing about configuration or HTTP. It provides the
//! low-level pieces that [`crate::service`] assembles.
//!
//! # Envelope format
//!
//! ```text
//! base64( {"version":<u32>,"iv":"<hex16>","salt":"<hex16>","tag":"<hex16>","encrypted":"<hex>"} )
//! ```
//!
//! `version` selects the master secret, `salt` feeds scrypt, `iv` and `tag` are
//! the GCM nonce and authentication tag.

pub mod cipher;
pub mod envelope;
pub mod kdf;

pub use envelope::{encryption_version, Envelope};

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the per-envelope GCM IV.
pub const IV_LEN: usize = 16;

/// Byte length of the per-envelope scrypt salt.
pub const SALT_LEN: usize = 16;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Fill a zeroizing buffer from the OS CSPRNG.
///
/// # Errors
///
/// Surfaces the OS error if randomness is unavailable; callers do not retry.
pub fn random_bytes<const N: usize>() -> Result<Zeroizing<[u8; N]>, rand::Error> {
    let mut buf = Zeroizing::new([0u8; N]);
    OsRng.try_fill_bytes(&mut buf[..])?;
    Ok(buf)
}
