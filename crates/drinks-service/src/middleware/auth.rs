//! Authorization middleware for protected routes.
//!
//! Runs the auth gate ahead of the protected handler and injects the
//! verified claims into the request extensions. Handlers never reach the
//! extractor or verifier directly; any failure in the gate short-circuits
//! the request before `next` runs.

use crate::auth::{AuthGate, Claims};
use crate::errors::AuthError;
use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::instrument;

/// Authorize a request against a required permission, then continue.
///
/// On success the verified [`Claims`] are stored in the request extensions
/// for the handler. On failure the gate's error is returned unmodified and
/// the handler is never invoked.
#[instrument(skip_all, fields(permission = %permission), name = "ds.middleware.auth")]
pub async fn require_permission(
    gate: Arc<AuthGate>,
    permission: &'static str,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = gate.authorize(req.headers(), permission).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Authenticate a request without a permission requirement, then continue.
///
/// Used by routes that only need a verified identity.
#[instrument(skip_all, name = "ds.middleware.auth")]
pub async fn require_auth(
    gate: Arc<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = gate.authenticate(req.headers()).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extension trait for extracting claims from a request.
pub trait ClaimsExt {
    /// Get the authenticated claims from request extensions.
    ///
    /// Returns `None` if no auth middleware ran for this request.
    fn claims(&self) -> Option<&Claims>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn claims(&self) -> Option<&Claims> {
        self.extensions().get::<Claims>()
    }
}
