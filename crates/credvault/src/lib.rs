//! `credvault` — encryption at rest for user-supplied provider API keys.
//!
//! Secrets are sealed with AES-256-GCM under a key derived by scrypt from a
//! versioned master secret and a per-envelope salt. The result is an opaque,
//! self-describing envelope string that callers persist as-is.
//!
//! ```no_run
//! # async fn demo() -> Result<(), credvault::CredentialError> {
//! use credvault::{CredentialCipher, KeyRing};
//!
//! let cipher = CredentialCipher::new(
//!     KeyRing::new(1).with_secret(1, "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%"),
//! );
//! let envelope = cipher.encrypt("sk-live-123").await?;
//! assert_eq!(cipher.decrypt(&envelope).await?, "sk-live-123");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod present;
pub mod server;
pub mod service;
pub mod telemetry;

pub use crypto::encryption_version;
pub use error::CredentialError;
pub use keys::{validate_encryption_key, KeyRing, KeyStrength};
pub use present::{generate_secure_secret, mask_api_key, validate_api_key};
pub use service::CredentialCipher;
