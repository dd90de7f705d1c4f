//! Authentication handlers

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::models::{
    AccessTokenResponse, SocialLoginPayload, TokenObtainRequest, TokenPair, TokenRefreshRequest,
    TokenType, TokenVerifyRequest,
};
use super::providers::ProviderError;
use super::services::UserService;
use super::tokens::TokenError;
use crate::common::{safe_email_log, safe_token_log, ApiError, JsonBody, SharedState};

/// POST /auth/token_login/:provider/
/// Exchanges a provider-issued access token for a session token pair
///
/// # Request Body
/// ```json
/// { "access_token": "<provider access token>" }
/// ```
///
/// # Response
/// ```json
/// { "refresh": "<jwt>", "access": "<jwt>" }
/// ```
pub async fn social_token_login(
    Extension(state_lock): Extension<SharedState>,
    Path(provider_name): Path<String>,
    body: JsonBody,
) -> Result<Json<TokenPair>, ApiError> {
    let state = state_lock.read().await.clone();
    let payload: SocialLoginPayload = body.parse()?;

    let access_token = match payload.access_token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            warn!(provider = %provider_name, "Social login without access_token");
            return Err(ApiError::BadRequest("access_token is required".to_string()));
        }
    };

    let provider = state.providers.get(&provider_name).ok_or_else(|| {
        warn!(provider = %provider_name, "Social login for unknown provider");
        ApiError::BadRequest(format!("Unknown provider: {}", provider_name))
    })?;

    info!(
        provider = provider.name(),
        token = %safe_token_log(&access_token),
        "🔐 Received social token login"
    );

    let identity = match provider.fetch_identity(&access_token).await {
        Ok(identity) => identity,
        Err(ProviderError::InvalidToken) => {
            return Err(ApiError::Unauthorized("Invalid token".to_string()));
        }
        Err(ProviderError::MissingIdentity(field)) => {
            warn!(provider = provider.name(), missing = field, "Provider identity incomplete");
            return Err(ApiError::Unauthorized("Invalid token".to_string()));
        }
        Err(ProviderError::Upstream(raw)) => {
            error!(provider = provider.name(), error = %raw, "Provider call failed");
            return Err(ApiError::InternalServer(format!(
                "Authentication failed: {}",
                raw
            )));
        }
    };

    let user = UserService::new(state.db.clone())
        .resolve_social_user(&identity)
        .await?;

    if !user.is_active {
        warn!(user_id = %user.id, "Social login for inactive user");
        return Err(ApiError::Unauthorized("User is inactive".to_string()));
    }

    let pair = state.tokens.issue_pair(&user.id).map_err(token_issue_error)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = provider.name(),
        "✅ Social login successful"
    );

    Ok(Json(pair))
}

/// POST /token/
/// Username/password login
pub async fn obtain_token_pair(
    Extension(state_lock): Extension<SharedState>,
    body: JsonBody,
) -> Result<Json<TokenPair>, ApiError> {
    let state = state_lock.read().await.clone();
    let request: TokenObtainRequest = body.parse()?;

    let mut missing = Vec::new();
    if request.username.as_deref().map_or(true, str::is_empty) {
        missing.push("username");
    }
    if request.password.as_deref().map_or(true, str::is_empty) {
        missing.push("password");
    }
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = UserService::new(state.db.clone())
        .authenticate(&username, &password)
        .await?;

    let pair = state.tokens.issue_pair(&user.id).map_err(token_issue_error)?;
    info!(user_id = %user.id, "Password login successful");

    Ok(Json(pair))
}

/// POST /token/refresh/
/// Mints a new access token from a refresh token
pub async fn refresh_token(
    Extension(state_lock): Extension<SharedState>,
    body: JsonBody,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let request: TokenRefreshRequest = body.parse()?;

    let refresh = request
        .refresh
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required fields: refresh".to_string()))?;

    let claims = state
        .tokens
        .validate(&refresh, Some(TokenType::Refresh))
        .map_err(token_not_valid)?;

    let users = UserService::new(state.db.clone());
    match users.find_by_id(&claims.user_id).await? {
        Some(user) if user.is_active => {}
        _ => {
            warn!(user_id = %claims.user_id, "Refresh for missing or inactive user");
            return Err(ApiError::TokenNotValid("Token is invalid or expired".to_string()));
        }
    }

    let access = state
        .tokens
        .issue(&claims.user_id, TokenType::Access)
        .map_err(token_issue_error)?;

    Ok(Json(AccessTokenResponse { access }))
}

/// POST /token/verify/
/// Succeeds with `{}` for any valid session token
pub async fn verify_token(
    Extension(state_lock): Extension<SharedState>,
    body: JsonBody,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let request: TokenVerifyRequest = body.parse()?;

    let token = request
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing required fields: token".to_string()))?;

    state.tokens.validate(&token, None).map_err(token_not_valid)?;

    Ok(Json(json!({})))
}

fn token_not_valid(e: TokenError) -> ApiError {
    match e {
        TokenError::WrongType(_) => {
            ApiError::TokenNotValid("Token has wrong type".to_string())
        }
        _ => ApiError::TokenNotValid("Token is invalid or expired".to_string()),
    }
}

fn token_issue_error(e: TokenError) -> ApiError {
    error!(error = %e, "Failed to issue session token");
    ApiError::InternalServer("Failed to issue token".to_string())
}
