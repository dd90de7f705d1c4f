use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::{ResumeFields, ResumeRow, SaveMode};
use super::validators::ResumeValidator;
use crate::common::db::is_unique_violation;
use crate::common::{generate_resume_id, ApiError, Validator};

const RESUME_COLUMNS: &str = "id, user_id, title, summary, education, experience, skills, \
                              additional_information, created_at, updated_at";

pub struct ResumeService {
    db: SqlitePool,
}

/// Result of a write: the stored row and whether it was just created
#[derive(Debug)]
pub struct SavedResume {
    pub row: ResumeRow,
    pub created: bool,
}

impl ResumeService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn get_for_user(&self, user_id: &str) -> Result<Option<ResumeRow>, ApiError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {} FROM resumes WHERE user_id = ?",
            RESUME_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    /// Create or update the caller's single resume
    pub async fn save(
        &self,
        user_id: &str,
        fields: ResumeFields,
        mode: SaveMode,
    ) -> Result<SavedResume, ApiError> {
        match self.get_for_user(user_id).await? {
            Some(existing) => {
                let row = self.update(existing, fields).await?;
                Ok(SavedResume { row, created: false })
            }
            None if mode == SaveMode::UpdateOnly => {
                Err(ApiError::NotFound("Resume not found".to_string()))
            }
            None => match self.create(user_id, &fields).await {
                Ok(row) => Ok(SavedResume { row, created: true }),
                Err(ApiError::DatabaseError(e)) if is_unique_violation(&e) => {
                    // Lost a race with another create for the same user
                    warn!(user_id = %user_id, "Concurrent resume create, applying as update");
                    let existing = self
                        .get_for_user(user_id)
                        .await?
                        .ok_or(ApiError::DatabaseError(e))?;
                    let row = self.update(existing, fields).await?;
                    Ok(SavedResume { row, created: false })
                }
                Err(e) => Err(e),
            },
        }
    }

    async fn create(&self, user_id: &str, fields: &ResumeFields) -> Result<ResumeRow, ApiError> {
        ResumeValidator { creating: true }.validate(fields).into_result()?;

        let resume_id = generate_resume_id();
        let now = timestamp(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO resumes (
                id, user_id, title, summary, education, experience, skills,
                additional_information, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resume_id)
        .bind(user_id)
        .bind(fields.title.as_deref().unwrap_or_default())
        .bind(encode(fields.summary.as_ref()))
        .bind(encode(fields.education.as_ref()))
        .bind(encode(fields.experience.as_ref()))
        .bind(encode(fields.skills.as_ref()))
        .bind(encode(fields.additional_information.as_ref()))
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        info!(user_id = %user_id, resume_id = %resume_id, "Created resume");

        self.require(user_id).await
    }

    async fn update(&self, existing: ResumeRow, fields: ResumeFields) -> Result<ResumeRow, ApiError> {
        ResumeValidator { creating: false }.validate(&fields).into_result()?;

        if fields.is_empty() {
            debug!(resume_id = %existing.id, "Resume write without writable fields");
        }

        let updated_at = next_updated_at(&existing.updated_at, Utc::now());

        let title = fields.title.unwrap_or(existing.title);
        let summary = merge(fields.summary, existing.summary);
        let education = merge(fields.education, existing.education);
        let experience = merge(fields.experience, existing.experience);
        let skills = merge(fields.skills, existing.skills);
        let additional_information =
            merge(fields.additional_information, existing.additional_information);

        sqlx::query(
            r#"
            UPDATE resumes
            SET title = ?, summary = ?, education = ?, experience = ?, skills = ?,
                additional_information = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&summary)
        .bind(&education)
        .bind(&experience)
        .bind(&skills)
        .bind(&additional_information)
        .bind(&updated_at)
        .bind(&existing.id)
        .execute(&self.db)
        .await?;

        info!(user_id = %existing.user_id, resume_id = %existing.id, "Updated resume");

        self.require(&existing.user_id).await
    }

    async fn require(&self, user_id: &str) -> Result<ResumeRow, ApiError> {
        self.get_for_user(user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("resume vanished after write".to_string()))
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `max(now, previous)`, so `updated_at` never moves backwards
pub fn next_updated_at(previous: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) if prev.with_timezone(&Utc) > now => timestamp(prev.with_timezone(&Utc)),
        _ => timestamp(now),
    }
}

fn encode(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "null".to_string())
}

fn merge(provided: Option<Value>, stored: String) -> String {
    provided.map(|v| v.to_string()).unwrap_or(stored)
}
