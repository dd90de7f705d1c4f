//! OAuth identity providers
//!
//! A provider turns a provider-issued access token into a verified identity by
//! calling the provider's OpenID Connect userinfo endpoint. Google tokens are
//! additionally checked against the configured client id through tokeninfo.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::config::AppConfig;

pub const GOOGLE: &str = "google-oauth2";
pub const LINKEDIN: &str = "linkedin-oauth2";

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const LINKEDIN_USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the token
    #[error("Invalid token")]
    InvalidToken,

    /// The provider accepted the token but the identity is unusable
    #[error("Provider response missing {0}")]
    MissingIdentity(&'static str),

    /// Anything else: transport failure, unexpected status, undecodable body
    #[error("{0}")]
    Upstream(String),
}

/// Identity confirmed by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    pub provider: &'static str,
    pub subject: String,
    pub email: String,
    pub email_verified: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Canonical provider name stored on the user record
    fn name(&self) -> &'static str;

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: Option<String>,
    email: Option<String>,
    email_verified: Option<serde_json::Value>,
    given_name: Option<String>,
    family_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    azp: Option<String>,
}

#[derive(Debug, Clone)]
struct AudienceCheck {
    tokeninfo_url: String,
    client_id: String,
}

/// Provider backed by an OpenID Connect userinfo endpoint
#[derive(Debug, Clone)]
pub struct OpenIdProvider {
    name: &'static str,
    userinfo_url: String,
    audience: Option<AudienceCheck>,
    http: Client,
}

impl OpenIdProvider {
    pub fn new(name: &'static str, userinfo_url: impl Into<String>, http: Client) -> Self {
        Self {
            name,
            userinfo_url: userinfo_url.into(),
            audience: None,
            http,
        }
    }

    /// Require the token to have been issued to `client_id`
    pub fn with_audience_check(
        mut self,
        tokeninfo_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.audience = Some(AudienceCheck {
            tokeninfo_url: tokeninfo_url.into(),
            client_id: client_id.into(),
        });
        self
    }

    async fn check_audience(
        &self,
        check: &AudienceCheck,
        access_token: &str,
    ) -> Result<(), ProviderError> {
        let resp = self
            .http
            .get(&check.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;

        let status = resp.status();
        if is_rejection(status) {
            warn!(provider = self.name, http_status = %status, "tokeninfo rejected token");
            return Err(ProviderError::InvalidToken);
        }
        if !status.is_success() {
            return Err(ProviderError::Upstream(format!(
                "tokeninfo returned HTTP {}",
                status
            )));
        }

        let info: TokenInfo = resp
            .json()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;

        let matches = info.aud.as_deref() == Some(check.client_id.as_str())
            || info.azp.as_deref() == Some(check.client_id.as_str());
        if !matches {
            warn!(
                provider = self.name,
                token_audience = ?info.aud,
                expected_client_id = %check.client_id,
                "Token audience validation failed - rejecting token"
            );
            return Err(ProviderError::InvalidToken);
        }

        debug!(provider = self.name, "Token audience validation successful");
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for OpenIdProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        if let Some(check) = &self.audience {
            self.check_audience(check, access_token).await?;
        }

        debug!(provider = self.name, "Requesting userinfo from provider");

        let resp = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;

        let status = resp.status();
        if is_rejection(status) {
            warn!(provider = self.name, http_status = %status, "Provider rejected access token");
            return Err(ProviderError::InvalidToken);
        }
        if !status.is_success() {
            return Err(ProviderError::Upstream(format!(
                "{} userinfo returned HTTP {}",
                self.name, status
            )));
        }

        let info: UserInfo = resp
            .json()
            .await
            .map_err(|e| ProviderError::Upstream(e.to_string()))?;

        let subject = info
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(ProviderError::MissingIdentity("sub"))?;
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or(ProviderError::MissingIdentity("email"))?;

        // Google sends a boolean, some providers send "true"/"false"
        let email_verified = match info.email_verified {
            Some(serde_json::Value::Bool(b)) => Some(b),
            Some(serde_json::Value::String(s)) => Some(s.eq_ignore_ascii_case("true")),
            _ => None,
        };
        if email_verified == Some(false) {
            warn!(provider = self.name, "Provider reports unverified email address");
        }

        Ok(ProviderIdentity {
            provider: self.name,
            subject,
            email: email.to_lowercase(),
            email_verified,
            first_name: info.given_name,
            last_name: info.family_name,
        })
    }
}

fn is_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}

/// Provider lookup by the name used in the login path
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Google and LinkedIn, each under its canonical and short name
    pub fn from_config(config: &AppConfig, http: Client) -> Self {
        let mut google = OpenIdProvider::new(
            GOOGLE,
            config
                .google
                .userinfo_url
                .clone()
                .unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string()),
            http.clone(),
        );
        if let Some(client_id) = &config.google.client_id {
            google = google.with_audience_check(
                config
                    .google
                    .tokeninfo_url
                    .clone()
                    .unwrap_or_else(|| GOOGLE_TOKENINFO_URL.to_string()),
                client_id.clone(),
            );
        }

        let linkedin = OpenIdProvider::new(
            LINKEDIN,
            config
                .linkedin
                .userinfo_url
                .clone()
                .unwrap_or_else(|| LINKEDIN_USERINFO_URL.to_string()),
            http,
        );

        let google: Arc<dyn IdentityProvider> = Arc::new(google);
        let linkedin: Arc<dyn IdentityProvider> = Arc::new(linkedin);

        let mut registry = Self::new();
        registry.register(GOOGLE, google.clone());
        registry.register("google", google);
        registry.register(LINKEDIN, linkedin.clone());
        registry.register("linkedin", linkedin);
        registry
    }

    pub fn register(&mut self, alias: &str, provider: Arc<dyn IdentityProvider>) {
        self.providers.insert(alias.to_lowercase(), provider);
    }

    pub fn get(&self, alias: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(&alias.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_userinfo_success_builds_identity() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/userinfo")
                    .header("authorization", "Bearer good-token");
                then.status(200).json_body(json!({
                    "sub": "1234",
                    "email": "Ann@Example.com",
                    "email_verified": true,
                    "given_name": "Ann",
                    "family_name": "Lee"
                }));
            })
            .await;

        let provider = OpenIdProvider::new(GOOGLE, server.url("/userinfo"), Client::new());
        let identity = provider.fetch_identity("good-token").await.unwrap();

        assert_eq!(identity.provider, GOOGLE);
        assert_eq!(identity.subject, "1234");
        assert_eq!(identity.email, "ann@example.com");
        assert_eq!(identity.email_verified, Some(true));
        assert_eq!(identity.first_name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(401).json_body(json!({"error": "invalid_token"}));
            })
            .await;

        let provider = OpenIdProvider::new(LINKEDIN, server.url("/userinfo"), Client::new());
        let result = provider.fetch_identity("bad-token").await;

        assert!(matches!(result, Err(ProviderError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(503);
            })
            .await;

        let provider = OpenIdProvider::new(GOOGLE, server.url("/userinfo"), Client::new());
        let result = provider.fetch_identity("token").await;

        assert!(matches!(result, Err(ProviderError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_missing_email_is_missing_identity() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(200).json_body(json!({"sub": "1234"}));
            })
            .await;

        let provider = OpenIdProvider::new(GOOGLE, server.url("/userinfo"), Client::new());
        let result = provider.fetch_identity("token").await;

        assert!(matches!(result, Err(ProviderError::MissingIdentity("email"))));
    }

    #[tokio::test]
    async fn test_audience_mismatch_is_invalid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/tokeninfo");
                then.status(200)
                    .json_body(json!({"aud": "someone-else", "azp": "someone-else"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/userinfo");
                then.status(200)
                    .json_body(json!({"sub": "1", "email": "a@example.com"}));
            })
            .await;

        let provider = OpenIdProvider::new(GOOGLE, server.url("/userinfo"), Client::new())
            .with_audience_check(server.url("/tokeninfo"), "my-client-id");
        let result = provider.fetch_identity("token").await;

        assert!(matches!(result, Err(ProviderError::InvalidToken)));
    }

    #[test]
    fn test_registry_resolves_aliases_case_insensitively() {
        let registry = ProviderRegistry::from_config(&AppConfig::for_tests(), Client::new());

        assert_eq!(registry.get("google-oauth2").unwrap().name(), GOOGLE);
        assert_eq!(registry.get("Google").unwrap().name(), GOOGLE);
        assert_eq!(registry.get("linkedin").unwrap().name(), LINKEDIN);
        assert!(registry.get("github").is_none());
    }
}
