//! Drinks service error types.
//!
//! Two error families live here:
//!
//! - [`AuthError`] - rejections produced inside the authorization call chain.
//!   Each variant carries a stable machine-readable code, a human-readable
//!   description and an HTTP status, and is surfaced to the boundary verbatim.
//! - [`ApiError`] - everything else a handler can fail with. Database causes
//!   are logged server-side and replaced with a generic message.
//!
//! Every error renders as `{"success": false, "error": <code>,
//! "description": <text>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authorization failure.
///
/// Raised by the token extractor, the key set cache, the token verifier, the
/// permission checker, or the auth gate composing them. The first failure in
/// the chain short-circuits; nothing downstream runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is expected in request")]
    MissingAuthHeader,

    #[error("Authorization header must be a bearer token")]
    MalformedHeader,

    #[error("Unable to parse authentication token")]
    MalformedToken,

    #[error("Unable to find the appropriate key")]
    KeyNotFound,

    #[error("Token expired")]
    TokenExpired,

    #[error("Incorrect claims, check the audience and issuer")]
    ClaimsInvalid,

    #[error("Permissions not included in token")]
    PermissionsClaimMissing,

    #[error("Permission not found")]
    Forbidden,

    #[error("Signing key set is unavailable")]
    KeySetUnavailable,
}

impl AuthError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "authorization_header_missing",
            AuthError::MalformedHeader => "invalid_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::TokenExpired => "token_expired",
            AuthError::ClaimsInvalid => "invalid_claims",
            AuthError::PermissionsClaimMissing => "permissions_missing",
            AuthError::Forbidden => "forbidden",
            AuthError::KeySetUnavailable => "key_set_unavailable",
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MalformedHeader
            | AuthError::MalformedToken
            | AuthError::TokenExpired
            | AuthError::ClaimsInvalid => StatusCode::UNAUTHORIZED,
            AuthError::KeyNotFound | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            AuthError::KeySetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Service error for request handling outside the auth chain.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    description: String,
}

fn error_response(status: StatusCode, code: &str, description: String) -> Response {
    let body = ErrorBody {
        success: false,
        error: code.to_string(),
        description,
    };

    let mut response = (status, Json(body)).into_response();

    // 401 responses advertise the expected scheme.
    if status == StatusCode::UNAUTHORIZED {
        if let Ok(header_value) = "Bearer realm=\"drinks-api\", error=\"invalid_token\"".parse() {
            response
                .headers_mut()
                .insert("WWW-Authenticate", header_value);
        }
    }

    response
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self == AuthError::KeySetUnavailable {
            // The interesting cause was already logged by the JWKS client;
            // this records that a request was turned away because of it.
            tracing::warn!(target: "ds.auth", "Rejecting request: signing key set unavailable");
        }
        error_response(self.status(), self.code(), self.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Database(err) => {
                // Log the actual error server-side, return a generic message.
                tracing::error!(target: "ds.db", error = %err, "Database operation failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "An internal database error occurred".to_string(),
                )
            }
            ApiError::NotFound(resource) => {
                error_response(StatusCode::NOT_FOUND, "not_found", resource)
            }
            ApiError::Unprocessable(reason) => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, "unprocessable", reason)
            }
            ApiError::Conflict(reason) => error_response(StatusCode::CONFLICT, "conflict", reason),
            ApiError::Auth(err) => err.into_response(),
            ApiError::Internal => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}
