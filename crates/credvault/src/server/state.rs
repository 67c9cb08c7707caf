//! Shared application state injected into every Axum handler.

use crate::service::CredentialCipher;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the cipher holds its key ring behind an `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cipher: CredentialCipher,
}

impl AppState {
    pub fn new(cipher: CredentialCipher) -> Self {
        Self { cipher }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// State with one strong secret at version 1 and a weak one at version 9,
    /// suitable for tests.
    fn default() -> Self {
        use crate::keys::KeyRing;
        Self::new(CredentialCipher::new(
            KeyRing::new(1)
                .with_secret(1, "kP9#vX2$mQ7!tR4&wZ8*yB3@nH6^jL5%")
                .with_secret(9, "weak"),
        ))
    }
}
