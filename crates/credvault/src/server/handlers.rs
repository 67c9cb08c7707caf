//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    DecryptResponse, EncryptRequest, EnvelopeRequest, EnvelopeResponse, ErrorResponse,
    HealthResponse, InspectResponse, MaskRequest, MaskResponse, RotateRequest,
};
use common::ServiceError;
use tracing::{debug, warn};

use super::state::AppState;
use crate::crypto::encryption_version;
use crate::error::CredentialError;
use crate::present::{mask_api_key, validate_api_key};

/// `POST /v1/credentials/encrypt` — seal a plaintext credential.
///
/// Uses the requested key version, or the current one when omitted. A body
/// whose `plaintext` is not a string is rejected as invalid input.
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection, CredentialError::InvalidInput),
    };
    let version = req.version.unwrap_or_else(|| state.cipher.current_version());
    match state.cipher.encrypt_with_version(&req.plaintext, version).await {
        Ok(envelope) => (StatusCode::OK, Json(EnvelopeResponse { envelope, version })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /v1/credentials/decrypt` — recover the plaintext from an envelope.
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<EnvelopeRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection, NOT_AN_ENVELOPE),
    };
    match state.cipher.decrypt(&req.envelope).await {
        Ok(plaintext) => (StatusCode::OK, Json(DecryptResponse { plaintext })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /v1/credentials/rotate` — re-encrypt an envelope under a new version.
pub async fn rotate(
    State(state): State<AppState>,
    body: Result<Json<RotateRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => {
            return rejected(rejection, CredentialError::Rotation(Box::new(NOT_AN_ENVELOPE)))
        }
    };
    let version = req
        .target_version
        .unwrap_or_else(|| state.cipher.current_version());
    match state.cipher.rotate(&req.envelope, version).await {
        Ok(envelope) => (StatusCode::OK, Json(EnvelopeResponse { envelope, version })).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /v1/credentials/inspect` — report an envelope's key version.
///
/// Unreadable envelopes report `version: null`; only a body without a string
/// `envelope` is rejected.
pub async fn inspect(
    State(state): State<AppState>,
    body: Result<Json<EnvelopeRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection, NOT_AN_ENVELOPE),
    };
    let version = encryption_version(&req.envelope);
    let body = InspectResponse {
        version,
        current: version == Some(state.cipher.current_version()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `POST /v1/credentials/mask` — display-safe rendering of an API key.
pub async fn mask(body: Result<Json<MaskRequest>, JsonRejection>) -> Response {
    let Json(req) = match body {
        Ok(req) => req,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "request body rejected");
            let err = ServiceError::BadRequest("key must be a string or null".into());
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&err))).into_response();
        }
    };
    let key = req.key.as_deref();
    let body = MaskResponse {
        present: validate_api_key(key),
        masked: mask_api_key(key),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the current key version resolves to a valid secret.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let ring = state.cipher.key_ring();
    let ready = ring.encryption_key(ring.current_version()).is_ok();

    let (status_code, status_str) = if ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        current_version: ring.current_version(),
        key_versions: ring.versions(),
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

const NOT_AN_ENVELOPE: CredentialError = CredentialError::InvalidFormat("envelope must be a string");

/// Body did not deserialise: answer with the JSON error for `err` instead of
/// axum's plain-text rejection.
fn rejected(rejection: JsonRejection, err: CredentialError) -> Response {
    debug!(error = %rejection.body_text(), "request body rejected");
    error_response(err)
}

fn error_response(err: CredentialError) -> Response {
    warn!(error = %err, root = %err.root_cause(), "credential operation failed");
    let err = ServiceError::from(err);
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(&err))).into_response()
}
