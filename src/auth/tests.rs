//! Tests for auth module
//!
//! These tests verify:
//! - Social token login against a mocked provider
//! - Password login through `/token/`
//! - Refresh and verify semantics
//! - Bearer authentication on protected routes

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::app::testing::{send, TestApp};
    use axum::http::StatusCode;
    use httpmock::prelude::*;
    use providers::{IdentityProvider, OpenIdProvider, ProviderRegistry, GOOGLE};
    use reqwest::Client;
    use serde_json::json;
    use std::sync::Arc;

    /// App whose `google` provider points at the mock server
    async fn app_with_mock_google(server: &MockServer) -> TestApp {
        let provider: Arc<dyn IdentityProvider> = Arc::new(OpenIdProvider::new(
            GOOGLE,
            server.url("/userinfo"),
            Client::new(),
        ));
        let mut registry = ProviderRegistry::new();
        registry.register(GOOGLE, provider.clone());
        registry.register("google", provider);
        TestApp::with_providers(registry).await
    }

    async fn mock_userinfo(server: &MockServer, status: u16, body: serde_json::Value) {
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/userinfo");
                then.status(status).json_body(body);
            })
            .await;
    }

    // ============================================================================
    // Social Login Tests
    // ============================================================================

    #[tokio::test]
    async fn test_social_login_creates_user_and_issues_pair() {
        let server = MockServer::start_async().await;
        mock_userinfo(
            &server,
            200,
            json!({"sub": "g-1", "email": "Jane@Example.com", "given_name": "Jane"}),
        )
        .await;
        let app = app_with_mock_google(&server).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/auth/token_login/google-oauth2/",
            None,
            Some(json!({"access_token": "provider-token"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap();
        assert!(body["refresh"].is_string());

        let claims = app
            .tokens()
            .validate(access, Some(models::TokenType::Access))
            .unwrap();
        let (username, email): (String, String) =
            sqlx::query_as("SELECT username, email FROM users WHERE id = ?")
                .bind(&claims.user_id)
                .fetch_one(&app.db)
                .await
                .unwrap();
        assert_eq!(username, "jane");
        assert_eq!(email, "jane@example.com");

        // The session works on a protected route
        let (status, _) = send(&app.router, "GET", "/profile/", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_repeat_social_login_reuses_user() {
        let server = MockServer::start_async().await;
        mock_userinfo(&server, 200, json!({"sub": "g-1", "email": "jane@example.com"})).await;
        let app = app_with_mock_google(&server).await;
        let body = json!({"access_token": "provider-token"});

        for _ in 0..2 {
            let (status, _) = send(
                &app.router,
                "POST",
                "/auth/token_login/google/",
                None,
                Some(body.clone()),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&app.db)
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_social_login_requires_access_token() {
        let server = MockServer::start_async().await;
        let app = app_with_mock_google(&server).await;

        for body in [None, Some(json!({})), Some(json!({"access_token": "  "}))] {
            let (status, response) = send(
                &app.router,
                "POST",
                "/auth/token_login/google-oauth2/",
                None,
                body,
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "access_token is required");
        }
    }

    #[tokio::test]
    async fn test_social_login_unknown_provider() {
        let server = MockServer::start_async().await;
        let app = app_with_mock_google(&server).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/auth/token_login/github/",
            None,
            Some(json!({"access_token": "t"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown provider: github");
    }

    #[tokio::test]
    async fn test_social_login_rejected_token() {
        let server = MockServer::start_async().await;
        mock_userinfo(&server, 401, json!({"error": "invalid_token"})).await;
        let app = app_with_mock_google(&server).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/auth/token_login/google-oauth2/",
            None,
            Some(json!({"access_token": "expired"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_social_login_provider_failure_is_server_error() {
        let server = MockServer::start_async().await;
        mock_userinfo(&server, 500, json!({"error": "backend"})).await;
        let app = app_with_mock_google(&server).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/auth/token_login/google-oauth2/",
            None,
            Some(json!({"access_token": "t"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Authentication failed: "));
    }

    #[tokio::test]
    async fn test_social_login_unreachable_provider_echoes_error() {
        let provider: Arc<dyn IdentityProvider> = Arc::new(OpenIdProvider::new(
            GOOGLE,
            "http://127.0.0.1:9/userinfo",
            Client::new(),
        ));
        let mut registry = ProviderRegistry::new();
        registry.register(GOOGLE, provider);
        let app = TestApp::with_providers(registry).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/auth/token_login/google-oauth2/",
            None,
            Some(json!({"access_token": "t"})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        let detail = message.strip_prefix("Authentication failed: ").unwrap();
        assert!(detail.contains("127.0.0.1:9"), "unexpected error text: {}", detail);
    }

    #[tokio::test]
    async fn test_social_login_unverified_email_cannot_claim_account() {
        let server = MockServer::start_async().await;
        mock_userinfo(
            &server,
            200,
            json!({"sub": "g-2", "email": "ann@example.com", "email_verified": false}),
        )
        .await;
        let app = app_with_mock_google(&server).await;
        let owner_id = app.insert_user("ann", None).await;

        let (status, _) = send(
            &app.router,
            "POST",
            "/auth/token_login/google-oauth2/",
            None,
            Some(json!({"access_token": "t"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (provider,): (Option<String>,) =
            sqlx::query_as("SELECT provider FROM users WHERE id = ?")
                .bind(&owner_id)
                .fetch_one(&app.db)
                .await
                .unwrap();
        assert!(provider.is_none());
    }

    // ============================================================================
    // Password Login Tests
    // ============================================================================

    #[tokio::test]
    async fn test_password_login() {
        let app = TestApp::new().await;
        app.insert_user("ann", Some("s3cret-pass")).await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/token/",
            None,
            Some(json!({"username": "ann", "password": "s3cret-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access"].is_string());
        assert!(body["refresh"].is_string());

        let (status, body) = send(
            &app.router,
            "POST",
            "/token/",
            None,
            Some(json!({"username": "ann", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"],
            "No active account found with the given credentials"
        );
    }

    #[tokio::test]
    async fn test_password_login_for_social_only_account() {
        let app = TestApp::new().await;
        app.insert_user("ann", None).await;

        let (status, _) = send(
            &app.router,
            "POST",
            "/token/",
            None,
            Some(json!({"username": "ann", "password": "anything"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_password_login_missing_fields() {
        let app = TestApp::new().await;

        let (status, body) = send(&app.router, "POST", "/token/", None, Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: username, password");
    }

    // ============================================================================
    // Refresh and Verify Tests
    // ============================================================================

    #[tokio::test]
    async fn test_refresh_issues_access_token() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let pair = app.tokens().issue_pair(&user_id).unwrap();

        let (status, body) = send(
            &app.router,
            "POST",
            "/token/refresh/",
            None,
            Some(json!({"refresh": pair.refresh})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap();
        let claims = app
            .tokens()
            .validate(access, Some(models::TokenType::Access))
            .unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let pair = app.tokens().issue_pair(&user_id).unwrap();

        let (status, body) = send(
            &app.router,
            "POST",
            "/token/refresh/",
            None,
            Some(json!({"refresh": pair.access})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn test_refresh_for_inactive_user() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let pair = app.tokens().issue_pair(&user_id).unwrap();
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&user_id)
            .execute(&app.db)
            .await
            .unwrap();

        let (status, _) = send(
            &app.router,
            "POST",
            "/token/refresh/",
            None,
            Some(json!({"refresh": pair.refresh})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_accepts_either_token_type() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let pair = app.tokens().issue_pair(&user_id).unwrap();

        for token in [pair.access, pair.refresh] {
            let (status, body) = send(
                &app.router,
                "POST",
                "/token/verify/",
                None,
                Some(json!({ "token": token })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({}));
        }

        let (status, body) = send(
            &app.router,
            "POST",
            "/token/verify/",
            None,
            Some(json!({"token": "garbage"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn test_protected_route_for_inactive_user() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let access = app.tokens().issue_pair(&user_id).unwrap().access;
        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(&user_id)
            .execute(&app.db)
            .await
            .unwrap();

        let (status, _) = send(&app.router, "GET", "/resume/", Some(&access), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
