// src/host_middleware.rs
//! `Host` header check against ALLOWED_HOSTS

use axum::{
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::common::error::ErrorResponse;

/// Allowed host patterns: `*` (anything), `.example.com` (domain and
/// subdomains) or an exact host name. Ports are ignored.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    patterns: Vec<String>,
}

impl AllowedHosts {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn allows_any(&self) -> bool {
        self.patterns.iter().any(|p| p == "*")
    }

    pub fn is_allowed(&self, host_header: &str) -> bool {
        let host = strip_port(host_header).to_lowercase();
        self.patterns.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(domain) = pattern.strip_prefix('.') {
                host == domain || host.ends_with(pattern.as_str())
            } else {
                host == *pattern
            }
        })
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(bracketed) = host.strip_prefix('[') {
        // [ipv6]:port
        return bracketed.split(']').next().unwrap_or(bracketed);
    }
    host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host)
}

pub async fn enforce_allowed_hosts(
    State(allowed): State<Arc<AllowedHosts>>,
    request: Request,
    next: Next,
) -> Response {
    if allowed.allows_any() {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().host().map(str::to_string));

    match host {
        Some(h) if allowed.is_allowed(&h) => next.run(request).await,
        other => {
            warn!(host = ?other, "Rejected request with disallowed Host header");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid HTTP_HOST header".to_string(),
                    code: "BAD_REQUEST".to_string(),
                    fields: None,
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(patterns: &[&str]) -> AllowedHosts {
        AllowedHosts::new(&patterns.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_wildcard_allows_everything() {
        let allowed = hosts(&["*"]);
        assert!(allowed.allows_any());
        assert!(allowed.is_allowed("anything.test:8000"));
    }

    #[test]
    fn test_exact_and_subdomain_patterns() {
        let allowed = hosts(&["api.example.com", ".resume.dev"]);

        assert!(allowed.is_allowed("api.example.com"));
        assert!(allowed.is_allowed("API.example.com:443"));
        assert!(allowed.is_allowed("resume.dev"));
        assert!(allowed.is_allowed("www.resume.dev:8000"));
        assert!(!allowed.is_allowed("example.com"));
        assert!(!allowed.is_allowed("evilresume.dev"));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("localhost:8000"), "localhost");
        assert_eq!(strip_port("localhost"), "localhost");
        assert_eq!(strip_port("[::1]:8000"), "::1");
    }
}
