// src/profile/handlers.rs

use axum::extract::{Extension, Json};
use tracing::warn;

use super::models::{ProfileResponse, UpdateProfileRequest};
use super::services::ProfileService;
use crate::auth::models::UserSummary;
use crate::auth::services::UserService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, JsonBody, SharedState};

/// GET /profile/ - Current user's profile
pub async fn get_profile(
    Extension(state_lock): Extension<SharedState>,
    authed: AuthedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    build_response(&state.db, &authed).await
}

/// PUT/PATCH /profile/ - Update avatar and/or bio
pub async fn update_profile(
    Extension(state_lock): Extension<SharedState>,
    authed: AuthedUser,
    JsonBody(body): JsonBody,
) -> Result<Json<ProfileResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let request = UpdateProfileRequest::from_json(&body).map_err(|result| {
        warn!(user_id = %authed.id, "Profile update with malformed fields");
        ApiError::from(result)
    })?;

    ProfileService::new(state.db.clone())
        .update(&authed.id, request)
        .await?;

    build_response(&state.db, &authed).await
}

async fn build_response(
    db: &sqlx::SqlitePool,
    authed: &AuthedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = ProfileService::new(db.clone())
        .get_or_create(&authed.id)
        .await?;

    let user = UserService::new(db.clone())
        .find_by_id(&authed.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: UserSummary::from(&user),
        avatar: profile.avatar,
        bio: profile.bio,
    }))
}
