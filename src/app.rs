// src/app.rs
//! Router composition shared by the server binary and the router tests

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::auth_routes;
use crate::common::{AppConfig, SharedState};
use crate::conversion::conversion_routes;
use crate::host_middleware::{enforce_allowed_hosts, AllowedHosts};
use crate::logging_middleware::{log_request_response, log_requests};
use crate::profile::profile_routes;
use crate::resume::resume_routes;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(shared: SharedState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .route("/health/", get(health))
        .merge(auth_routes())
        .merge(resume_routes())
        .merge(conversion_routes())
        .merge(profile_routes());

    // Request/response bodies only in debug mode
    if config.debug {
        app = app.layer(middleware::from_fn(log_request_response));
    }

    let allowed_hosts = Arc::new(AllowedHosts::new(&config.allowed_hosts));

    app.layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn_with_state(allowed_hosts, enforce_allowed_hosts))
        .layer(Extension(shared))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Credentials cannot be combined with a wildcard origin
    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(origins).allow_credentials(true)
}
