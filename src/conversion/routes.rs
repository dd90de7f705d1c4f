use axum::{routing::post, Router};

use super::handlers;

pub fn conversion_routes() -> Router {
    Router::new().route("/resume/convert/", post(handlers::convert_resume))
}
