//! Authentication routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/token_login/:provider/` - Exchange a provider token for a session pair
/// - `POST /token/` - Username/password login
/// - `POST /token/refresh/` - New access token from a refresh token
/// - `POST /token/verify/` - Check a session token
pub fn auth_routes() -> Router {
    Router::new()
        .route(
            "/auth/token_login/:provider/",
            post(handlers::social_token_login),
        )
        .route("/token/", post(handlers::obtain_token_pair))
        .route("/token/refresh/", post(handlers::refresh_token))
        .route("/token/verify/", post(handlers::verify_token))
}
