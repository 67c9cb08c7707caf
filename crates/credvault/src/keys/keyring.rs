//! [`KeyRing`]: immutable map from key version to master secret.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer};
use tracing::warn;
use zeroize::Zeroizing;

use super::strength::validate_encryption_key;
use crate::error::CredentialError;

/// An operator-configured passphrase for one key version.
///
/// The backing memory is overwritten with zeroes on drop. Cloning produces an
/// independent buffer that is zeroed on its own drop.
#[derive(Clone)]
pub struct MasterSecret(Zeroizing<String>);

impl MasterSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Borrow the secret. Callers must not log or persist the returned value.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("MasterSecret([REDACTED])")
    }
}

impl<'de> Deserialize<'de> for MasterSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(MasterSecret::new)
    }
}

/// Master secrets indexed by key version, plus the version new envelopes use.
///
/// Built once at startup from [`crate::config::Config`] and shared read-only.
#[derive(Debug, Clone)]
pub struct KeyRing {
    current_version: u32,
    secrets: BTreeMap<u32, MasterSecret>,
}

impl KeyRing {
    /// Create an empty ring whose current version is `current_version`.
    pub fn new(current_version: u32) -> Self {
        Self {
            current_version,
            secrets: BTreeMap::new(),
        }
    }

    /// Register (or replace) the secret for `version`.
    pub fn with_secret(mut self, version: u32, secret: impl Into<String>) -> Self {
        self.secrets.insert(version, MasterSecret::new(secret));
        self
    }

    pub(crate) fn from_parts(current_version: u32, secrets: HashMap<u32, MasterSecret>) -> Self {
        Self {
            current_version,
            secrets: secrets.into_iter().collect(),
        }
    }

    /// Version that encryption uses when the caller does not pick one.
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// All configured versions, ascending.
    pub fn versions(&self) -> Vec<u32> {
        self.secrets.keys().copied().collect()
    }

    /// Look up and validate the master secret for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Configuration`] if no secret is registered for
    /// `version` or `version` is 0, or [`CredentialError::WeakKey`] if it fails
    /// [`validate_encryption_key`].
    pub fn encryption_key(&self, version: u32) -> Result<&MasterSecret, CredentialError> {
        // Envelopes only carry positive versions; a version-0 secret could seal
        // but never open.
        let secret = self
            .secrets
            .get(&version)
            .filter(|_| version > 0)
            .ok_or(CredentialError::Configuration { version })?;
        if !validate_encryption_key(secret.expose()) {
            return Err(CredentialError::WeakKey { version });
        }
        Ok(secret)
    }

    /// Startup check: the current version must resolve to a strong secret.
    ///
    /// Older versions that fail validation are only warned about, since they
    /// may still be needed while records migrate.
    ///
    /// # Errors
    ///
    /// Returns the lookup error for the current version.
    pub fn check(&self) -> Result<(), CredentialError> {
        for (&version, secret) in &self.secrets {
            if version != self.current_version && !validate_encryption_key(secret.expose()) {
                warn!(version, "master secret fails strength validation");
            }
        }
        self.encryption_key(self.current_version).map(|_| ())
    }
}
