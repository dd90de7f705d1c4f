use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::User;
use super::passwords::verify_password;
use super::providers::ProviderIdentity;
use crate::common::db::is_unique_violation;
use crate::common::{generate_user_id, safe_email_log, ApiError};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, \
                            provider, provider_id, is_active, created_at";

pub struct UserService {
    db: SqlitePool,
}

impl UserService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE provider = ? AND provider_id = ?",
            USER_COLUMNS
        ))
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower(?)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    /// Find or create the local account for a provider identity.
    ///
    /// Lookup order is the provider association, then the email address (the
    /// association is recorded on the existing account), then a new account.
    /// Linking by email requires the provider to report the address verified.
    pub async fn resolve_social_user(&self, identity: &ProviderIdentity) -> Result<User, ApiError> {
        if let Some(user) = self
            .find_by_provider(identity.provider, &identity.subject)
            .await?
        {
            debug!(user_id = %user.id, provider = identity.provider, "Matched user by provider association");
            return Ok(user);
        }

        if let Some(user) = self.find_by_email(&identity.email).await? {
            if identity.email_verified != Some(true) {
                warn!(
                    user_id = %user.id,
                    provider = identity.provider,
                    email_verified = ?identity.email_verified,
                    "Refusing to link unverified email to existing user"
                );
                return Err(ApiError::Unauthorized(
                    "Email address is not verified by the provider".to_string(),
                ));
            }
            if user.provider.is_some() && user.provider.as_deref() != Some(identity.provider) {
                warn!(
                    user_id = %user.id,
                    existing_provider = ?user.provider,
                    provider = identity.provider,
                    "Re-linking account to a different provider"
                );
            }
            sqlx::query("UPDATE users SET provider = ?, provider_id = ? WHERE id = ?")
                .bind(identity.provider)
                .bind(&identity.subject)
                .bind(&user.id)
                .execute(&self.db)
                .await?;
            info!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                provider = identity.provider,
                "Linked provider identity to existing user"
            );
            return self.require(&user.id).await;
        }

        self.create_social_user(identity).await
    }

    async fn create_social_user(&self, identity: &ProviderIdentity) -> Result<User, ApiError> {
        let user_id = generate_user_id();
        let username = self.unique_username(&identity.email).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, provider, provider_id, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&username)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(identity.provider)
        .bind(&identity.subject)
        .bind(&now)
        .execute(&self.db)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                // Lost a race with a concurrent first login for the same identity
                if let Some(user) = self
                    .find_by_provider(identity.provider, &identity.subject)
                    .await?
                {
                    warn!(user_id = %user.id, provider = identity.provider, "Concurrent social signup, using existing user");
                    return Ok(user);
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            user_id = %user_id,
            username = %username,
            email = %safe_email_log(&identity.email),
            provider = identity.provider,
            "Created user from social login"
        );

        self.require(&user_id).await
    }

    /// Check username/password credentials. Any failure is reported the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let rejected =
            || ApiError::Unauthorized("No active account found with the given credentials".to_string());

        let user = match self.find_by_username(username).await? {
            Some(user) => user,
            None => {
                debug!(username = %username, "Password login for unknown username");
                return Err(rejected());
            }
        };

        let verified = user
            .password_hash
            .as_deref()
            .map(|hash| verify_password(password, hash))
            .unwrap_or(false);

        if !verified || !user.is_active {
            warn!(user_id = %user.id, "Password login rejected");
            return Err(rejected());
        }

        Ok(user)
    }

    /// Username derived from the email local part, suffixed until unique
    pub async fn unique_username(&self, email: &str) -> Result<String, ApiError> {
        let base = username_base(email);
        if self.find_by_username(&base).await?.is_none() {
            return Ok(base);
        }

        let mut suffix = 1;
        loop {
            let candidate = format!("{}{}", base, suffix);
            if self.find_by_username(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    async fn require(&self, user_id: &str) -> Result<User, ApiError> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user vanished after write".to_string()))
    }
}

/// Keep letters, digits and `.`, `_`, `-`, `+` from the local part; fall back to "user"
fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or("");
    let cleaned: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'))
        .take(150)
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}
