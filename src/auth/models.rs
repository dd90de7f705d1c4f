//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which half of the session pair a JWT is
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub user_id: String,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
}

/// Public view of a user, nested in profile responses
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
        }
    }
}

/// Body of `POST /auth/token_login/:provider/`
#[derive(Deserialize, Debug, Default)]
pub struct SocialLoginPayload {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Body of `POST /token/`
#[derive(Deserialize, Debug, Default)]
pub struct TokenObtainRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /token/refresh/`
#[derive(Deserialize, Debug, Default)]
pub struct TokenRefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of `POST /token/verify/`
#[derive(Deserialize, Debug, Default)]
pub struct TokenVerifyRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Signed session pair returned by every login path
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AccessTokenResponse {
    pub access: String,
}
