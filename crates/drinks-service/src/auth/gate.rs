//! The auth gate: the single entry point for authorizing requests.
//!
//! Composes token extraction, verification and the permission check in
//! strict sequence. The first failure short-circuits and its error
//! propagates to the boundary unmodified. Protected operations go through
//! this gate (via the auth middleware); they never call the extractor,
//! verifier or permission checker directly.

use crate::auth::claims::Claims;
use crate::auth::extract::extract_bearer_token;
use crate::auth::permissions::check_permission;
use crate::auth::verify::TokenVerifier;
use crate::errors::AuthError;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::instrument;

/// Request authorization gate.
pub struct AuthGate {
    /// Token verifier with its JWKS client.
    verifier: Arc<TokenVerifier>,
}

impl AuthGate {
    /// Create a new auth gate.
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Authenticate a request: extract the bearer token and verify it.
    ///
    /// Used by routes that require a verified identity but no particular
    /// permission.
    ///
    /// # Errors
    ///
    /// Propagates the extractor's and verifier's errors unchanged.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;
        self.verifier.verify(token).await
    }

    /// Authorize a request: authenticate, then check the required permission.
    ///
    /// # Errors
    ///
    /// Propagates the first failure in the extract - verify - check chain
    /// unchanged.
    #[instrument(skip_all, fields(required = %required))]
    pub async fn authorize(&self, headers: &HeaderMap, required: &str) -> Result<Claims, AuthError> {
        let claims = self.authenticate(headers).await?;
        check_permission(required, &claims)?;
        Ok(claims)
    }
}
