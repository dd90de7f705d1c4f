// src/profile/models.rs

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::auth::models::UserSummary;
use crate::common::ValidationResult;

pub const AVATAR_MAX_CHARS: usize = 500;
pub const BIO_MAX_CHARS: usize = 500;

#[derive(FromRow, Debug, Clone)]
pub struct Profile {
    pub user_id: String,
    pub avatar: Option<String>,
    pub bio: String,
    pub updated_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub user: UserSummary,
    pub avatar: Option<String>,
    pub bio: String,
}

/// Body of `PUT/PATCH /profile/`. Absent fields are left alone;
/// `"avatar": null` clears the avatar.
#[derive(Debug, Default, PartialEq)]
pub struct UpdateProfileRequest {
    pub avatar: Option<Option<String>>,
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    /// Read the writable fields from a JSON body, reporting type errors per field
    pub fn from_json(body: &Value) -> Result<Self, ValidationResult> {
        let mut result = ValidationResult::new();
        let mut request = Self::default();

        let Some(object) = body.as_object() else {
            result.add_error("non_field_errors", "Invalid data. Expected a dictionary.");
            return Err(result);
        };

        match object.get("avatar") {
            None => {}
            Some(Value::Null) => request.avatar = Some(None),
            Some(Value::String(s)) if s.is_empty() => request.avatar = Some(None),
            Some(Value::String(s)) => request.avatar = Some(Some(s.clone())),
            Some(_) => result.add_error("avatar", "Not a valid string."),
        }

        match object.get("bio") {
            None => {}
            Some(Value::String(s)) => request.bio = Some(s.clone()),
            Some(Value::Null) => result.add_error("bio", "This field may not be null."),
            Some(_) => result.add_error("bio", "Not a valid string."),
        }

        if result.is_valid {
            Ok(request)
        } else {
            Err(result)
        }
    }
}
