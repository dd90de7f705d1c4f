// src/profile/validators.rs

use super::models::{UpdateProfileRequest, AVATAR_MAX_CHARS, BIO_MAX_CHARS};
use crate::common::validation::check_max_chars;
use crate::common::{ValidationResult, Validator};

pub struct ProfileValidator;

impl Validator<UpdateProfileRequest> for ProfileValidator {
    fn validate(&self, data: &UpdateProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Some(bio) = &data.bio {
            check_max_chars(&mut result, "bio", bio, BIO_MAX_CHARS);
        }

        if let Some(Some(avatar)) = &data.avatar {
            if !is_http_url(avatar) {
                result.add_error("avatar", "Enter a valid URL.");
            }
            check_max_chars(&mut result, "avatar", avatar, AVATAR_MAX_CHARS);
        }

        result
    }
}

/// Absolute http(s) URL with a host
pub fn is_http_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}
