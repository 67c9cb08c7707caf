//! The self-describing envelope persisted for each encrypted credential.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{IV_LEN, SALT_LEN, TAG_LEN};
use crate::error::CredentialError;

const REQUIRED_FIELDS: [&str; 5] = ["version", "iv", "salt", "tag", "encrypted"];

/// A parsed envelope. Byte fields are hex strings in the JSON form.
///
/// Zeroed on drop so the salt and IV copies do not outlive the call that used
/// them.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Envelope {
    /// Key version whose master secret sealed this envelope.
    pub version: u32,
    #[serde(with = "hex::serde")]
    pub iv: [u8; IV_LEN],
    #[serde(with = "hex::serde")]
    pub salt: [u8; SALT_LEN],
    #[serde(with = "hex::serde")]
    pub tag: [u8; TAG_LEN],
    #[serde(with = "hex::serde")]
    pub encrypted: Vec<u8>,
}

impl Envelope {
    /// Serialise to the opaque wire string: base64 of the JSON object.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error (not expected in practice).
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = Zeroizing::new(serde_json::to_vec(self)?);
        Ok(STANDARD.encode(json.as_slice()))
    }

    /// Parse an opaque wire string. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidFormat`] if the input is empty, not
    /// base64, not a JSON object, lacks any of the five fields, or carries a
    /// field of the wrong type or length.
    pub fn decode(s: &str) -> Result<Self, CredentialError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CredentialError::InvalidFormat("empty envelope"));
        }
        let json = Zeroizing::new(
            STANDARD
                .decode(s)
                .map_err(|_| CredentialError::InvalidFormat("not base64"))?,
        );
        // Values are skipped here so the hex salt and IV are only ever copied
        // into `Envelope`, which zeroes itself on drop.
        let fields: HashMap<String, IgnoredAny> = serde_json::from_slice(&json)
            .map_err(|e| match e.classify() {
                Category::Data => CredentialError::InvalidFormat("not a JSON object"),
                _ => CredentialError::InvalidFormat("not JSON"),
            })?;
        if REQUIRED_FIELDS.iter().any(|f| !fields.contains_key(*f)) {
            return Err(CredentialError::InvalidFormat("missing required field"));
        }

        let envelope: Envelope = serde_json::from_slice(&json)
            .map_err(|_| CredentialError::InvalidFormat("invalid field value"))?;
        if envelope.version == 0 {
            return Err(CredentialError::InvalidFormat("key version must be positive"));
        }
        Ok(envelope)
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("version", &self.version)
            .field("encrypted_len", &self.encrypted.len())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct VersionOnly {
    version: u32,
}

/// Read the key version from an envelope without decrypting it.
///
/// Returns `None` on any parse failure. Only the `version` field is
/// inspected, so partially damaged envelopes still report their version.
pub fn encryption_version(envelope: &str) -> Option<u32> {
    let json = STANDARD.decode(envelope.trim()).ok()?;
    let parsed: VersionOnly = serde_json::from_slice(&json).ok()?;
    (parsed.version > 0).then_some(parsed.version)
}
