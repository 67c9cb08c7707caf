//! Display helpers for provider API keys and master-secret generation.
//!
//! Masking is for display only. It is not a security boundary: the full key is
//! still available server-side.

use rand::{rngs::OsRng, Rng};

/// Character used in place of hidden key characters.
pub const MASK_CHAR: char = '•';

/// Default length for [`generate_secure_secret`].
pub const DEFAULT_SECRET_LENGTH: usize = 64;

/// 90-character alphabet for generated master secrets.
const SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?/~";

/// `true` iff `key` is present and has non-whitespace content.
///
/// A presence check only; the key's format is not inspected.
pub fn validate_api_key(key: Option<&str>) -> bool {
    key.is_some_and(|k| !k.trim().is_empty())
}

/// Mask `key` for display.
///
/// Keys of up to 8 characters are fully masked. Longer keys keep their first
/// and last 4 characters. `None` yields an empty string.
pub fn mask_api_key(key: Option<&str>) -> String {
    let Some(key) = key else {
        return String::new();
    };
    let chars: Vec<char> = key.chars().collect();
    let len = chars.len();
    if len <= 8 {
        return MASK_CHAR.to_string().repeat(len);
    }

    let mut masked = String::with_capacity(key.len() + (len - 8) * MASK_CHAR.len_utf8());
    masked.extend(&chars[..4]);
    masked.extend(std::iter::repeat(MASK_CHAR).take(len - 8));
    masked.extend(&chars[len - 4..]);
    masked
}

/// Generate a uniformly random secret of `length` characters from the OS CSPRNG.
///
/// Intended for operators provisioning a new master secret.
pub fn generate_secure_secret(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| SECRET_ALPHABET[rng.gen_range(0..SECRET_ALPHABET.len())] as char)
        .collect()
}
