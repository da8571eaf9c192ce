//! Current principal handler.
//!
//! Returns the authenticated caller's claims as placed in the request
//! extensions by the auth middleware.

use crate::auth::Claims;
use axum::{Extension, Json};
use serde::Serialize;
use tracing::instrument;

/// Response for the `/me` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// Subject (user or client ID).
    pub sub: String,

    /// Permissions carried by the token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,

    /// Token expiration timestamp.
    pub exp: i64,

    /// Token issued-at timestamp, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Handler for GET /me
///
/// Requires a verified token via the auth middleware; no specific permission.
#[instrument(skip_all, name = "ds.handlers.me")]
pub async fn get_me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    tracing::debug!(target: "ds.handlers.me", "Returning principal claims");

    Json(MeResponse {
        sub: claims.sub,
        permissions: claims.permissions,
        exp: claims.exp,
        iat: claims.iat,
    })
}
