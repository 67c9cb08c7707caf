//! Master-secret management: version lookup and strength validation.
//!
//! # Security invariants
//!
//! - A master secret is **never** used directly as a cipher key; it only feeds
//!   [`crate::crypto::kdf`].
//! - Master secrets are never logged, and their `Debug` output is redacted.
//! - A secret that fails [`validate_encryption_key`] is never used, for either
//!   encryption or decryption.

pub mod keyring;
pub mod strength;

pub use keyring::{KeyRing, MasterSecret};
pub use strength::{validate_encryption_key, KeyStrength};
