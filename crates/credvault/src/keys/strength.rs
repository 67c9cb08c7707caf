//! Heuristic strength gate for master secrets.
//!
//! This is not a cryptographic guarantee. A passphrase can pass and still be
//! guessable, and an unusual but strong one (long, single-class diceware) can
//! fail. It exists to catch obvious operator mistakes before a secret is used
//! to derive keys.

use std::collections::HashMap;

/// Minimum secret length, in characters.
pub const MIN_SECRET_LEN: usize = 32;

/// Shannon entropy (bits per character) a secret must exceed.
pub const MIN_ENTROPY_BITS: f64 = 4.0;

/// Number of character classes (upper, lower, digit, other) required.
pub const MIN_CHAR_CLASSES: u8 = 3;

/// Measured properties of a candidate master secret.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyStrength {
    /// Length in characters.
    pub length: usize,
    /// Shannon entropy over character frequency, in bits per character.
    pub entropy: f64,
    /// How many of upper / lower / digit / other appear at least once.
    pub char_classes: u8,
}

impl KeyStrength {
    /// Measure `secret`.
    pub fn measure(secret: &str) -> Self {
        Self {
            length: secret.chars().count(),
            entropy: shannon_entropy(secret),
            char_classes: char_classes(secret),
        }
    }

    /// `true` when every threshold is met.
    pub fn is_acceptable(&self) -> bool {
        self.length >= MIN_SECRET_LEN
            && self.entropy > MIN_ENTROPY_BITS
            && self.char_classes >= MIN_CHAR_CLASSES
    }
}

/// Returns `true` only if `secret` is at least [`MIN_SECRET_LEN`] characters,
/// has more than [`MIN_ENTROPY_BITS`] bits of entropy per character, and uses
/// at least [`MIN_CHAR_CLASSES`] character classes.
pub fn validate_encryption_key(secret: &str) -> bool {
    KeyStrength::measure(secret).is_acceptable()
}

fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

fn char_classes(s: &str) -> u8 {
    let upper = s.chars().any(|c| c.is_ascii_uppercase());
    let lower = s.chars().any(|c| c.is_ascii_lowercase());
    let digit = s.chars().any(|c| c.is_ascii_digit());
    let other = s.chars().any(|c| !c.is_ascii_alphanumeric());
    [upper, lower, digit, other].into_iter().filter(|&b| b).count() as u8
}
