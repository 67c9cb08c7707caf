//! [`CredentialCipher`]: encrypt, decrypt and rotate credential envelopes.
//!
//! Calls are independent and may run concurrently; the only shared state is the
//! read-only [`KeyRing`]. scrypt runs on Tokio's blocking pool. Salt, IV and
//! derived key live in zeroizing buffers, so they are wiped on every exit path,
//! including when the caller drops the future mid-flight.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use crate::crypto::{cipher, kdf, random_bytes, Envelope, IV_LEN, SALT_LEN};
use crate::error::{BoxError, CredentialError};
use crate::keys::KeyRing;

/// Versioned encryption of small secrets at rest.
#[derive(Debug, Clone)]
pub struct CredentialCipher {
    keys: Arc<KeyRing>,
}

impl CredentialCipher {
    pub fn new(keys: KeyRing) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn key_ring(&self) -> &KeyRing {
        &self.keys
    }

    /// Version used by [`encrypt`](Self::encrypt).
    pub fn current_version(&self) -> u32 {
        self.keys.current_version()
    }

    /// Encrypt under the current key version.
    ///
    /// # Errors
    ///
    /// See [`encrypt_with_version`](Self::encrypt_with_version).
    pub async fn encrypt(&self, plaintext: &str) -> Result<String, CredentialError> {
        self.encrypt_with_version(plaintext, self.keys.current_version())
            .await
    }

    /// Encrypt `plaintext` under `version` and return the envelope string.
    ///
    /// Two calls with the same input produce different envelopes.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidInput`] for empty plaintext. Any later
    /// failure (missing or weak key, derivation, cipher, randomness) is returned
    /// as [`CredentialError::Encryption`] carrying the cause.
    #[instrument(skip_all, fields(version = version))]
    pub async fn encrypt_with_version(
        &self,
        plaintext: &str,
        version: u32,
    ) -> Result<String, CredentialError> {
        if plaintext.is_empty() {
            return Err(CredentialError::InvalidInput);
        }
        self.seal(plaintext, version).await.map_err(|cause| {
            warn!(error = %cause, "encryption failed");
            CredentialError::Encryption(cause)
        })
    }

    async fn seal(&self, plaintext: &str, version: u32) -> Result<String, BoxError> {
        let salt = random_bytes::<SALT_LEN>()?;
        let iv = random_bytes::<IV_LEN>()?;
        let secret = self.keys.encryption_key(version)?.clone();

        let key = kdf::derive_key(secret, salt.clone()).await?;
        let sealed = cipher::seal(&key[..], &iv, plaintext.as_bytes())?;

        let envelope = Envelope {
            version,
            iv: *iv,
            salt: *salt,
            tag: sealed.tag,
            encrypted: sealed.ciphertext,
        };
        Ok(envelope.encode()?)
    }

    /// Decrypt an envelope produced by [`encrypt`](Self::encrypt).
    ///
    /// The key version is taken from the envelope, so records sealed under a
    /// retired version stay readable while its secret is configured.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::InvalidFormat`] for empty or malformed input.
    /// - [`CredentialError::Configuration`] / [`CredentialError::WeakKey`] when
    ///   the embedded version cannot be resolved.
    /// - [`CredentialError::KeyDerivation`] if scrypt fails.
    /// - [`CredentialError::Decryption`] for any authentication or decoding
    ///   failure after that. It does not say which part was wrong.
    #[instrument(skip_all, fields(version))]
    pub async fn decrypt(&self, envelope: &str) -> Result<String, CredentialError> {
        let envelope = Envelope::decode(envelope)?;
        tracing::Span::current().record("version", envelope.version);

        let secret = self.keys.encryption_key(envelope.version)?.clone();
        let key = kdf::derive_key(secret, Zeroizing::new(envelope.salt)).await?;

        let mut plaintext = cipher::open(&key[..], &envelope.iv, &envelope.encrypted, &envelope.tag)
            .map_err(|e| {
                debug!(error = %e, "envelope failed authentication");
                CredentialError::Decryption
            })?;

        String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|e| {
            debug!("recovered plaintext is not UTF-8");
            let mut bytes = e.into_bytes();
            zeroize::Zeroize::zeroize(&mut bytes);
            CredentialError::Decryption
        })
    }

    /// Encrypt, mapping absent or blank input and every failure to `None`.
    ///
    /// Failures are logged and discarded; use [`encrypt`](Self::encrypt) when
    /// the caller must know persistence cannot proceed.
    pub async fn safe_encrypt(&self, plaintext: Option<&str>) -> Option<String> {
        let plaintext = plaintext.filter(|p| !p.trim().is_empty())?;
        match self.encrypt(plaintext).await {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(error = %e, "safe_encrypt swallowed failure");
                None
            }
        }
    }

    /// Decrypt, mapping absent or empty input and every failure to `None`.
    pub async fn safe_decrypt(&self, envelope: Option<&str>) -> Option<String> {
        let envelope = envelope.filter(|e| !e.is_empty())?;
        match self.decrypt(envelope).await {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                warn!(error = %e, "safe_decrypt swallowed failure");
                None
            }
        }
    }

    /// Decrypt with the envelope's own version, then re-encrypt under
    /// `target_version`. Nothing is persisted here.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Rotation`] wrapping whichever step failed.
    #[instrument(skip_all, fields(target_version = target_version))]
    pub async fn rotate(
        &self,
        envelope: &str,
        target_version: u32,
    ) -> Result<String, CredentialError> {
        let plaintext = self
            .decrypt(envelope)
            .await
            .map(Zeroizing::new)
            .map_err(|e| CredentialError::Rotation(Box::new(e)))?;
        let rotated = self
            .encrypt_with_version(&plaintext, target_version)
            .await
            .map_err(|e| CredentialError::Rotation(Box::new(e)))?;

        info!("envelope rotated");
        Ok(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption_version;

    const STRONG_V1: &str = "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%";
    const STRONG_V2: &str = "Gf4)Ud8(Ks1_Ya0+Ce7=Xi2~Wo9-Tn3<";

    fn cipher() -> CredentialCipher {
        CredentialCipher::new(
            KeyRing::new(1)
                .with_secret(1, STRONG_V1)
                .with_secret(2, STRONG_V2)
                .with_secret(9, "too-weak"),
        )
    }

    #[tokio::test]
    async fn round_trip_current_version() {
        let c = cipher();
        let envelope = c.encrypt("sk-1234567890abcdef").await.unwrap();
        assert_eq!(encryption_version(&envelope), Some(1));
        assert_eq!(c.decrypt(&envelope).await.unwrap(), "sk-1234567890abcdef");
    }

    #[tokio::test]
    async fn empty_plaintext_is_invalid_input() {
        assert!(matches!(
            cipher().encrypt("").await,
            Err(CredentialError::InvalidInput)
        ));
    }

    #[tokio::test]
    async fn unknown_version_is_wrapped_configuration_error() {
        let err = cipher().encrypt_with_version("sk", 4).await.unwrap_err();
        assert!(matches!(err, CredentialError::Encryption(_)));
        assert!(matches!(
            err.root_cause(),
            CredentialError::Configuration { version: 4 }
        ));
    }

    #[tokio::test]
    async fn weak_version_fails_closed() {
        let err = cipher().encrypt_with_version("sk", 9).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CredentialError::WeakKey { version: 9 }
        ));
    }

    #[tokio::test]
    async fn version_zero_cannot_seal() {
        let c = CredentialCipher::new(KeyRing::new(0).with_secret(0, STRONG_V1));
        let err = c.encrypt("sk-abc").await.unwrap_err();
        assert!(matches!(err, CredentialError::Encryption(_)));
        assert!(matches!(
            err.root_cause(),
            CredentialError::Configuration { version: 0 }
        ));
    }

    #[tokio::test]
    async fn decrypt_with_weak_embedded_version_fails_closed() {
        let envelope = cipher().encrypt_with_version("sk-weak", 2).await.unwrap();
        let weakened = CredentialCipher::new(
            KeyRing::new(1)
                .with_secret(1, STRONG_V1)
                .with_secret(2, "too-weak"),
        );
        assert!(matches!(
            weakened.decrypt(&envelope).await,
            Err(CredentialError::WeakKey { version: 2 })
        ));
    }

    #[tokio::test]
    async fn decrypt_with_unconfigured_version_is_configuration_error() {
        let envelope = cipher().encrypt_with_version("sk", 2).await.unwrap();
        let narrower = CredentialCipher::new(KeyRing::new(1).with_secret(1, STRONG_V1));
        assert!(matches!(
            narrower.decrypt(&envelope).await,
            Err(CredentialError::Configuration { version: 2 })
        ));
    }

    #[tokio::test]
    async fn different_secret_same_version_fails_decryption() {
        let envelope = cipher().encrypt("sk-abc").await.unwrap();
        let other = CredentialCipher::new(KeyRing::new(1).with_secret(1, STRONG_V2));
        assert!(matches!(
            other.decrypt(&envelope).await,
            Err(CredentialError::Decryption)
        ));
    }

    #[tokio::test]
    async fn safe_variants_swallow_failures() {
        let c = cipher();
        assert!(c.safe_encrypt(None).await.is_none());
        assert!(c.safe_encrypt(Some("")).await.is_none());
        assert!(c.safe_encrypt(Some("   ")).await.is_none());
        assert!(c.safe_decrypt(None).await.is_none());
        assert!(c.safe_decrypt(Some("")).await.is_none());
        assert!(c.safe_decrypt(Some("invalid")).await.is_none());

        let envelope = c.safe_encrypt(Some("sk-abc")).await.unwrap();
        assert_eq!(c.safe_decrypt(Some(envelope.as_str())).await.as_deref(), Some("sk-abc"));
    }

    #[tokio::test]
    async fn rotate_moves_to_target_version() {
        let c = cipher();
        let v1 = c.encrypt_with_version("sk-rotate-me", 1).await.unwrap();
        let v2 = c.rotate(&v1, 2).await.unwrap();
        assert_eq!(encryption_version(&v2), Some(2));
        assert_eq!(c.decrypt(&v2).await.unwrap(), "sk-rotate-me");
    }

    #[tokio::test]
    async fn rotate_failure_is_wrapped() {
        let c = cipher();
        let err = c.rotate("not-an-envelope", 2).await.unwrap_err();
        assert!(matches!(err, CredentialError::Rotation(_)));
        assert!(matches!(err.root_cause(), CredentialError::InvalidFormat(_)));

        let v1 = c.encrypt("sk").await.unwrap();
        let err = c.rotate(&v1, 5).await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            CredentialError::Configuration { version: 5 }
        ));
    }
}
