//! Conversion handlers

use axum::extract::{Extension, Json};
use tracing::{info, warn};

use super::models::{ConversionOutcome, ConvertRequest};
use super::source::is_valid_key;
use crate::auth::AuthedUser;
use crate::common::{safe_email_log, ApiError, JsonBody, SharedState};

/// POST /resume/convert/
/// Converts stored resume text; the result is returned, not saved
///
/// # Request Body
/// ```json
/// { "key": "resume", "force": false }
/// ```
pub async fn convert_resume(
    Extension(state_lock): Extension<SharedState>,
    user: AuthedUser,
    body: JsonBody,
) -> Result<Json<ConversionOutcome>, ApiError> {
    let state = state_lock.read().await.clone();
    let request: ConvertRequest = body.parse()?;

    let key = request
        .key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| state.conversion.default_key().to_string());

    if !is_valid_key(&key) {
        warn!(user_id = %user.id, key = %key, "Rejected conversion key");
        return Err(ApiError::BadRequest(format!("Invalid key: {}", key)));
    }

    let outcome = state
        .conversion
        .convert(&key, request.force.unwrap_or(false))
        .await;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        key = %key,
        origin = ?outcome.origin,
        "Resume conversion served"
    );

    Ok(Json(outcome))
}
