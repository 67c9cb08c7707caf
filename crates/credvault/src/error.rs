//! Error taxonomy for credential encryption.

use common::ServiceError;
use thiserror::Error;

/// Boxed cause carried by [`CredentialError::Encryption`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way an encrypt, decrypt, or rotate call can fail.
///
/// Display strings are safe to return to callers. They never include plaintext,
/// master secrets, or derived keys.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The plaintext handed to `encrypt` was empty or not a string.
    #[error("plaintext must be a non-empty string")]
    InvalidInput,

    /// No master secret is registered for the requested key version.
    #[error("no master secret configured for key version {version}")]
    Configuration { version: u32 },

    /// The master secret for this version failed strength validation.
    #[error("master secret for key version {version} failed strength validation")]
    WeakKey { version: u32 },

    /// scrypt could not run (bad parameters or resource exhaustion).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encryption failed after input validation; the cause is attached.
    #[error("encryption failed")]
    Encryption(#[source] BoxError),

    /// The envelope is not base64, not JSON, or lacks a required field.
    #[error("malformed envelope: {0}")]
    InvalidFormat(&'static str),

    /// Authentication or decryption failed.
    ///
    /// Deliberately does not say whether the key, ciphertext, or tag was at fault.
    #[error("decryption failed")]
    Decryption,

    /// Decrypt-then-re-encrypt failed; the failing step is attached.
    #[error("key rotation failed")]
    Rotation(#[source] Box<CredentialError>),
}

impl CredentialError {
    /// Walk through [`Encryption`](Self::Encryption) and
    /// [`Rotation`](Self::Rotation) wrappers to the innermost `CredentialError`.
    pub fn root_cause(&self) -> &CredentialError {
        match self {
            CredentialError::Rotation(inner) => inner.root_cause(),
            CredentialError::Encryption(cause) => match cause.downcast_ref::<CredentialError>() {
                Some(inner) => inner.root_cause(),
                None => self,
            },
            other => other,
        }
    }
}

impl From<CredentialError> for ServiceError {
    fn from(err: CredentialError) -> Self {
        let root = err.root_cause();
        let message = match root {
            CredentialError::Encryption(_) => err.to_string(),
            other => other.to_string(),
        };
        match root {
            CredentialError::InvalidInput
            | CredentialError::InvalidFormat(_)
            | CredentialError::Decryption => ServiceError::BadRequest(message),
            CredentialError::Configuration { .. } | CredentialError::WeakKey { .. } => {
                ServiceError::Unavailable(message)
            }
            CredentialError::KeyDerivation(_) | CredentialError::Encryption(_) => {
                ServiceError::EncryptionFailure(message)
            }
            CredentialError::Rotation(_) => ServiceError::Internal(message),
        }
    }
}
