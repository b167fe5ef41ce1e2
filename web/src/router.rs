//! Linked-role HTTP router.
//!
//! Composes all handlers into a single Axum router.

use crate::handlers;
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use linked_roles_discord::providers::{MetadataSource, TokenStore};

/// Create the linked-role router with all endpoints.
///
/// # Routes
///
/// - `GET /` - Greeting
/// - `GET /health` - Liveness check
/// - `GET /linked-role` - Redirect to the Discord consent page
/// - `GET /discord-oauth-callback` - Complete the authorization
/// - `POST /update-metadata` - Push a linked user's metadata
///
/// # Example
///
/// ```rust,ignore
/// let state = AppState::new(linked_roles, cookie_secret.as_bytes(), &redirect_uri)?;
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, router(state)).await?;
/// ```
pub fn router<T, M>(state: AppState<T, M>) -> Router
where
    T: TokenStore + 'static,
    M: MetadataSource + 'static,
{
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/linked-role", get(handlers::linked_role::<T, M>))
        .route(
            "/discord-oauth-callback",
            get(handlers::oauth_callback::<T, M>),
        )
        .route("/update-metadata", post(handlers::update_metadata::<T, M>))
        .layer(correlation_id_layer())
        .with_state(state)
}
