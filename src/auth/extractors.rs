//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use super::models::TokenType;
use super::services::UserService;
use super::tokens::TokenError;
use crate::common::{safe_email_log, ApiError, SharedState};

/// Authenticated user extractor
///
/// Accepts `Authorization: Bearer <access token>`. Refresh tokens, unknown
/// users and deactivated users are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let header = match parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            Some(h) => h,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized(
                    "Authentication credentials were not provided.".into(),
                ));
            }
        };

        let bare_token = match header.strip_prefix("Bearer ") {
            Some(rest) if !rest.trim().is_empty() => rest.trim(),
            _ => {
                warn!("Authentication failed: Authorization header is not a Bearer token");
                return Err(ApiError::Unauthorized(
                    "Authentication credentials were not provided.".into(),
                ));
            }
        };

        let claims = app_state
            .tokens
            .validate(bare_token, Some(TokenType::Access))
            .map_err(|e| match e {
                TokenError::WrongType(_) => {
                    ApiError::TokenNotValid("Given token not valid for any token type".into())
                }
                _ => ApiError::TokenNotValid("Token is invalid or expired".into()),
            })?;

        let user = UserService::new(app_state.db.clone())
            .find_by_id(&claims.user_id)
            .await?;

        match user {
            Some(u) if u.is_active => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    username: u.username,
                    email: u.email,
                })
            }
            Some(u) => {
                warn!(user_id = %u.id, "Authentication failed: user is inactive");
                Err(ApiError::Unauthorized("User is inactive".into()))
            }
            None => {
                warn!(user_id = %claims.user_id, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("User not found".into()))
            }
        }
    }
}
