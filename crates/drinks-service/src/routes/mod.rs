//! HTTP routes for the drinks service.
//!
//! Defines the Axum router and application state. Protected routes get
//! their auth guard attached here, ahead of the handler, so a handler can
//! only run once the gate has admitted the request.

use crate::auth::{AuthGate, JwksClient, TokenVerifier};
use crate::config::Config;
use crate::handlers;
use crate::middleware::auth::{require_auth, require_permission};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::routing::{delete, get, patch, post, MethodRouter};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Auth gate guarding protected routes.
    pub auth_gate: Arc<AuthGate>,
}

impl AppState {
    /// Build application state from a pool and configuration.
    ///
    /// Wires the JWKS client, token verifier and auth gate from the config.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let jwks_client = Arc::new(JwksClient::with_ttl(
            config.jwks_url.clone(),
            Duration::from_secs(config.jwks_cache_ttl_seconds),
        ));
        let verifier = Arc::new(TokenVerifier::new(
            jwks_client,
            config.issuer(),
            config.audience.clone(),
            config.jwt_leeway_seconds,
        ));
        let auth_gate = Arc::new(AuthGate::new(verifier));

        Self {
            pool,
            config,
            auth_gate,
        }
    }
}

/// Build a single protected route with its permission guard attached.
fn guarded_route(
    state: &Arc<AppState>,
    path: &str,
    method_router: MethodRouter<Arc<AppState>>,
    permission: &'static str,
) -> Router {
    let gate = state.auth_gate.clone();
    Router::new()
        .route(path, method_router)
        .route_layer(middleware::from_fn(move |req: Request, next: Next| {
            let gate = gate.clone();
            async move { require_permission(gate, permission, req, next).await }
        }))
        .with_state(state.clone())
}

/// Build the application routes.
///
/// - `GET /health` and `GET /drinks` are public
/// - every other route runs behind the auth gate
/// - TraceLayer logs requests; requests time out after 30 seconds
pub fn build_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/drinks", get(handlers::drinks::list_drinks))
        .with_state(state.clone());

    let me_route = {
        let gate = state.auth_gate.clone();
        Router::new()
            .route("/me", get(handlers::get_me))
            .route_layer(middleware::from_fn(move |req: Request, next: Next| {
                let gate = gate.clone();
                async move { require_auth(gate, req, next).await }
            }))
            .with_state(state.clone())
    };

    let protected_routes = guarded_route(
        &state,
        "/drinks-detail",
        get(handlers::drinks::list_drinks_detail),
        "get:drinks-detail",
    )
    .merge(guarded_route(
        &state,
        "/drinks",
        post(handlers::drinks::create_drink),
        "post:drinks",
    ))
    .merge(guarded_route(
        &state,
        "/drinks/:id",
        patch(handlers::drinks::update_drink),
        "patch:drinks",
    ))
    .merge(guarded_route(
        &state,
        "/drinks/:id",
        delete(handlers::drinks::delete_drink),
        "delete:drinks",
    ));

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - bound the request (innermost)
    // 2. TraceLayer - log request details
    public_routes
        .merge(me_route)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // AppState must implement Clone for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_config_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Config>();
    }
}
