//! Tests for resume module
//!
//! These tests verify:
//! - Field extraction from request bodies (read-only and null handling)
//! - Create and update validation
//! - Stored JSON decoding
//! - The `/resume/` endpoints end to end

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::app::testing::{send, TestApp};
    use crate::common::Validator;
    use axum::http::StatusCode;
    use models::{ResumeFields, ResumePayload, ResumeRow};
    use serde_json::{json, Value};
    use validators::ResumeValidator;

    fn full_body() -> Value {
        json!({
            "title": "Jane Doe - Engineer",
            "summary": {"professional_summary": "Builds reliable services"},
            "education": {"State University": "BSc Computer Science (2010-2014)"},
            "experience": [{"company": "Acme", "role": "Engineer", "highlights": ["Shipped v2"]}],
            "skills": ["Rust", "SQL"],
            "additional_information": {"languages": ["English", "Portuguese"]}
        })
    }

    // ============================================================================
    // Model Tests
    // ============================================================================

    #[test]
    fn test_read_only_fields_are_ignored() {
        let mut body = full_body();
        body["id"] = json!("R_FORGED");
        body["created_at"] = json!("2000-01-01T00:00:00Z");
        body["updated_at"] = json!("2000-01-01T00:00:00Z");

        let fields = ResumeFields::from_json(&body).unwrap();

        assert_eq!(fields.title.as_deref(), Some("Jane Doe - Engineer"));
        assert_eq!(fields.skills, Some(json!(["Rust", "SQL"])));
    }

    #[test]
    fn test_null_fields_are_errors() {
        let result = ResumeFields::from_json(&json!({"title": null, "skills": null})).unwrap_err();

        assert!(result.has_error_for("title"));
        assert!(result.has_error_for("skills"));
        assert!(!result.has_error_for("summary"));
    }

    #[test]
    fn test_structured_fields_accept_any_shape() {
        let fields = ResumeFields::from_json(&json!({
            "summary": "plain text summary",
            "education": ["list", "of", "schools"],
            "skills": 3
        }))
        .unwrap();

        assert_eq!(fields.summary, Some(json!("plain text summary")));
        assert!(ResumeValidator { creating: false }.validate(&fields).is_valid);
    }

    #[test]
    fn test_blank_title_is_rejected_on_update() {
        let fields = ResumeFields {
            title: Some("   ".to_string()),
            ..Default::default()
        };

        let result = ResumeValidator { creating: false }.validate(&fields);
        assert!(result.has_error_for("title"));
    }

    #[test]
    fn test_payload_decodes_stored_json() {
        let row = ResumeRow {
            id: "R_ABC123".to_string(),
            user_id: "U_ABC123".to_string(),
            title: "T".to_string(),
            summary: r#"{"professional_summary":"x"}"#.to_string(),
            education: "{}".to_string(),
            experience: "[]".to_string(),
            skills: r#"["Rust"]"#.to_string(),
            additional_information: "not json".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let payload = ResumePayload::from(row);

        assert_eq!(payload.summary["professional_summary"], "x");
        assert_eq!(payload.skills, json!(["Rust"]));
        assert_eq!(payload.additional_information, json!("not json"));
    }

    // ============================================================================
    // Endpoint Tests
    // ============================================================================

    #[tokio::test]
    async fn test_get_without_resume_is_404() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;

        let (status, body) = send(&app.router, "GET", "/resume/", Some(&token), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let app = TestApp::new().await;

        let (status, _) = send(&app.router, "GET", "/resume/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app.router, "GET", "/resume/", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_a_bearer_credential() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let pair = app.tokens().issue_pair(&user_id).unwrap();

        let (status, _) = send(&app.router, "GET", "/resume/", Some(&pair.refresh), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;

        let (status, created) =
            send(&app.router, "POST", "/resume/", Some(&token), Some(full_body())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, fetched) = send(&app.router, "GET", "/resume/", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        for field in ["title", "summary", "education", "experience", "skills", "additional_information"] {
            assert_eq!(fetched[field], full_body()[field], "field {}", field);
        }
        assert_eq!(fetched["id"], created["id"]);
        assert!(fetched["created_at"].is_string());
        assert!(fetched["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_second_post_updates_partially() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;
        let (_, created) =
            send(&app.router, "POST", "/resume/", Some(&token), Some(full_body())).await;

        let (status, updated) = send(
            &app.router,
            "POST",
            "/resume/",
            Some(&token),
            Some(json!({"title": "Jane Doe - Staff Engineer", "created_at": "1999-01-01T00:00:00Z"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Jane Doe - Staff Engineer");
        assert_eq!(updated["skills"], full_body()["skills"]);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert!(updated["updated_at"].as_str().unwrap() >= created["updated_at"].as_str().unwrap());
    }

    #[tokio::test]
    async fn test_create_with_missing_fields_names_them() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/resume/",
            Some(&token),
            Some(json!({"title": "Only title"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["fields"]["skills"].is_array());
        assert!(body["fields"]["summary"].is_array());
        assert!(body["fields"].get("title").is_none());
    }

    #[tokio::test]
    async fn test_oversized_title_names_title() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;
        let mut body = full_body();
        body["title"] = json!("x".repeat(201));

        let (status, body) = send(&app.router, "POST", "/resume/", Some(&token), Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"]["title"].is_array());
    }

    #[tokio::test]
    async fn test_patch_requires_existing_record() {
        let app = TestApp::new().await;
        let token = app.access_token_for_new_user("ann").await;

        let (status, _) = send(
            &app.router,
            "PATCH",
            "/resume/",
            Some(&token),
            Some(json!({"skills": ["Go"]})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app.router, "PUT", "/resume/", Some(&token), Some(full_body())).await;
        let (status, patched) = send(
            &app.router,
            "PATCH",
            "/resume/",
            Some(&token),
            Some(json!({"skills": ["Go"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["skills"], json!(["Go"]));
        assert_eq!(patched["title"], "Jane Doe - Engineer");
    }

    #[tokio::test]
    async fn test_resumes_are_per_user() {
        let app = TestApp::new().await;
        let ann = app.access_token_for_new_user("ann").await;
        let bob = app.access_token_for_new_user("bob").await;

        send(&app.router, "POST", "/resume/", Some(&ann), Some(full_body())).await;
        let (status, _) = send(&app.router, "GET", "/resume/", Some(&bob), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_resume() {
        let app = TestApp::new().await;
        let user_id = app.insert_user("ann", None).await;
        let token = app.tokens().issue_pair(&user_id).unwrap().access;
        send(&app.router, "POST", "/resume/", Some(&token), Some(full_body())).await;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user_id)
            .execute(&app.db)
            .await
            .unwrap();

        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM resumes")
            .fetch_one(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining.0, 0);
    }
}
