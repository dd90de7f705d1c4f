// src/resume/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn resume_routes() -> Router {
    Router::new().route(
        "/resume/",
        get(handlers::get_resume)
            .post(handlers::save_resume)
            .put(handlers::save_resume)
            .patch(handlers::patch_resume),
    )
}
