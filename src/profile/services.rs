use sqlx::SqlitePool;
use tracing::{debug, info};

use super::models::{Profile, UpdateProfileRequest};
use super::validators::ProfileValidator;
use crate::common::{ApiError, Validator};

pub struct ProfileService {
    db: SqlitePool,
}

impl ProfileService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// The user's profile, created empty on first access
    pub async fn get_or_create(&self, user_id: &str) -> Result<Profile, ApiError> {
        let inserted = sqlx::query(
            "INSERT INTO profiles (user_id, avatar, bio, updated_at) VALUES (?, NULL, '', ?) \
             ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() > 0 {
            debug!(user_id = %user_id, "Created empty profile");
        }

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, avatar, bio, updated_at FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(profile)
    }

    /// Apply the provided fields after validation
    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<Profile, ApiError> {
        ProfileValidator.validate(&request).into_result()?;

        let current = self.get_or_create(user_id).await?;

        let avatar = match request.avatar {
            Some(new_avatar) => new_avatar,
            None => current.avatar,
        };
        let bio = request.bio.unwrap_or(current.bio);

        sqlx::query("UPDATE profiles SET avatar = ?, bio = ?, updated_at = ? WHERE user_id = ?")
            .bind(&avatar)
            .bind(&bio)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.db)
            .await?;

        info!(user_id = %user_id, "Profile updated successfully");

        self.get_or_create(user_id).await
    }
}
