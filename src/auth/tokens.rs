//! Session token issuance and validation (HS256 JWTs)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Claims, TokenPair, TokenType};
use crate::common::config::TokenLifetimes;
use crate::common::generate_token_id;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid,

    #[error("Token has wrong type, expected {}", .0.as_str())]
    WrongType(TokenType),

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetimes: TokenLifetimes,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetimes", &self.lifetimes)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &str, lifetimes: TokenLifetimes) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetimes,
        }
    }

    /// Mint a refresh token and an access token for the user
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            refresh: self.issue(user_id, TokenType::Refresh)?,
            access: self.issue(user_id, TokenType::Access)?,
        })
    }

    pub fn issue(&self, user_id: &str, token_type: TokenType) -> Result<String, TokenError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => Duration::minutes(self.lifetimes.access_minutes),
            TokenType::Refresh => Duration::days(self.lifetimes.refresh_days),
        };
        let claims = Claims {
            token_type,
            exp: (now + lifetime).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: generate_token_id(),
            user_id: user_id.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(user_id = %user_id, token_type = token_type.as_str(), "Issued session token");
        Ok(token)
    }

    /// Validate signature and expiry; when `expected` is given the token type must match
    pub fn validate(&self, token: &str, expected: Option<TokenType>) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            TokenError::Invalid
        })?;

        if let Some(expected) = expected {
            if decoded.claims.token_type != expected {
                warn!(
                    expected = expected.as_str(),
                    actual = decoded.claims.token_type.as_str(),
                    "JWT token has wrong type"
                );
                return Err(TokenError::WrongType(expected));
            }
        }

        Ok(decoded.claims)
    }
}
