// src/resume/validators.rs

use super::models::{ResumeFields, STRUCTURED_FIELDS, TITLE_MAX_CHARS};
use crate::common::validation::check_max_chars;
use crate::common::{ValidationResult, Validator};

/// `creating` requires every writable field
pub struct ResumeValidator {
    pub creating: bool,
}

impl Validator<ResumeFields> for ResumeValidator {
    fn validate(&self, data: &ResumeFields) -> ValidationResult {
        let mut result = ValidationResult::new();

        match &data.title {
            Some(title) if title.trim().is_empty() => {
                result.add_error("title", "This field may not be blank.");
            }
            Some(title) => check_max_chars(&mut result, "title", title, TITLE_MAX_CHARS),
            None if self.creating => result.add_error("title", "This field is required."),
            None => {}
        }

        if self.creating {
            for name in STRUCTURED_FIELDS {
                if data.section(name).is_none() {
                    result.add_error(name, "This field is required.");
                }
            }
        }

        result
    }
}
