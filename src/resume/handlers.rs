// src/resume/handlers.rs

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use tracing::{debug, info};

use super::models::{ResumeFields, ResumePayload, SaveMode};
use super::services::ResumeService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, JsonBody, SharedState};

/// GET /resume/ - The caller's resume, 404 when none was saved yet
pub async fn get_resume(
    Extension(state_lock): Extension<SharedState>,
    authed: AuthedUser,
) -> Result<Json<ResumePayload>, ApiError> {
    let state = state_lock.read().await.clone();

    let row = ResumeService::new(state.db.clone())
        .get_for_user(&authed.id)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %authed.id, "No resume stored for user");
            ApiError::NotFound("Resume not found".to_string())
        })?;

    Ok(Json(ResumePayload::from(row)))
}

/// POST/PUT /resume/ - Create (201) or update (200) the caller's resume
pub async fn save_resume(
    Extension(state_lock): Extension<SharedState>,
    authed: AuthedUser,
    body: JsonBody,
) -> Result<(StatusCode, Json<ResumePayload>), ApiError> {
    write_resume(state_lock, authed, body, SaveMode::CreateOrUpdate).await
}

/// PATCH /resume/ - Partial update of an existing resume
pub async fn patch_resume(
    Extension(state_lock): Extension<SharedState>,
    authed: AuthedUser,
    body: JsonBody,
) -> Result<(StatusCode, Json<ResumePayload>), ApiError> {
    write_resume(state_lock, authed, body, SaveMode::UpdateOnly).await
}

async fn write_resume(
    state_lock: SharedState,
    authed: AuthedUser,
    JsonBody(body): JsonBody,
    mode: SaveMode,
) -> Result<(StatusCode, Json<ResumePayload>), ApiError> {
    let state = state_lock.read().await.clone();

    let fields = ResumeFields::from_json(&body).map_err(ApiError::from)?;

    let saved = ResumeService::new(state.db.clone())
        .save(&authed.id, fields, mode)
        .await?;

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    info!(
        user_id = %authed.id,
        username = %authed.username,
        resume_id = %saved.row.id,
        created = saved.created,
        "Resume saved"
    );

    Ok((status, Json(ResumePayload::from(saved.row))))
}
