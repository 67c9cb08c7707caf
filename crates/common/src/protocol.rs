//! Request and response types for the credvault HTTP API.
//!
//! Envelopes travel as opaque strings; nothing here knows their inner layout.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encrypt / decrypt
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/credentials/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// The secret to protect, e.g. a provider API key.
    pub plaintext: String,
    /// Key version to encrypt under. Defaults to the service's current version.
    #[serde(default)]
    pub version: Option<u32>,
}

/// Successful response body for encrypt and rotate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeResponse {
    /// Opaque envelope string to persist.
    pub envelope: String,
    /// Key version the envelope was sealed under.
    pub version: u32,
}

/// Request body for `POST /v1/credentials/decrypt` and `/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeRequest {
    pub envelope: String,
}

/// Successful response body for `POST /v1/credentials/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
}

// ---------------------------------------------------------------------------
// Rotation / inspection
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/credentials/rotate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateRequest {
    pub envelope: String,
    /// Version to re-encrypt under. Defaults to the service's current version.
    #[serde(default)]
    pub target_version: Option<u32>,
}

/// Response body for `POST /v1/credentials/inspect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectResponse {
    /// Embedded key version, or `null` when the envelope cannot be parsed.
    pub version: Option<u32>,
    /// Whether the envelope is already sealed under the current version.
    pub current: bool,
}

// ---------------------------------------------------------------------------
// Masking
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/credentials/mask`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaskRequest {
    #[serde(default)]
    pub key: Option<String>,
}

/// Response body for `POST /v1/credentials/mask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskResponse {
    /// Whether the key has any non-whitespace content.
    pub present: bool,
    /// Display-only rendering of the key.
    pub masked: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Key version new envelopes are sealed under.
    pub current_version: u32,
    /// All configured key versions, ascending.
    pub key_versions: Vec<u32>,
}
