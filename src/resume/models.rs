// src/resume/models.rs

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

use crate::common::ValidationResult;

pub const TITLE_MAX_CHARS: usize = 200;

/// Structured sections, stored as serialized JSON text
pub const STRUCTURED_FIELDS: [&str; 5] = [
    "summary",
    "education",
    "experience",
    "skills",
    "additional_information",
];

#[derive(FromRow, Debug, Clone)]
pub struct ResumeRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub summary: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
    pub additional_information: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Resume as returned to the client
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResumePayload {
    pub id: String,
    pub title: String,
    pub summary: Value,
    pub education: Value,
    pub experience: Value,
    pub skills: Value,
    pub additional_information: Value,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ResumeRow> for ResumePayload {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            summary: decode_stored(&row.summary),
            education: decode_stored(&row.education),
            experience: decode_stored(&row.experience),
            skills: decode_stored(&row.skills),
            additional_information: decode_stored(&row.additional_information),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Stored text that is not JSON (written outside this service) is returned as a string
fn decode_stored(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Writable fields of a resume write. `None` means "not provided".
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResumeFields {
    pub title: Option<String>,
    pub summary: Option<Value>,
    pub education: Option<Value>,
    pub experience: Option<Value>,
    pub skills: Option<Value>,
    pub additional_information: Option<Value>,
}

impl ResumeFields {
    /// Pick the writable fields out of a request body.
    /// `id`, `created_at`, `updated_at` and unknown keys are ignored.
    pub fn from_json(body: &Value) -> Result<Self, ValidationResult> {
        let mut result = ValidationResult::new();
        let mut fields = Self::default();

        let Some(object) = body.as_object() else {
            result.add_error("non_field_errors", "Invalid data. Expected a dictionary.");
            return Err(result);
        };

        match object.get("title") {
            None => {}
            Some(Value::String(s)) => fields.title = Some(s.clone()),
            Some(Value::Null) => result.add_error("title", "This field may not be null."),
            Some(_) => result.add_error("title", "Not a valid string."),
        }

        for name in STRUCTURED_FIELDS {
            match object.get(name) {
                None => {}
                Some(Value::Null) => result.add_error(name, "This field may not be null."),
                Some(value) => *fields.section_mut(name) = Some(value.clone()),
            }
        }

        if result.is_valid {
            Ok(fields)
        } else {
            Err(result)
        }
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        match name {
            "summary" => self.summary.as_ref(),
            "education" => self.education.as_ref(),
            "experience" => self.experience.as_ref(),
            "skills" => self.skills.as_ref(),
            "additional_information" => self.additional_information.as_ref(),
            _ => None,
        }
    }

    fn section_mut(&mut self, name: &str) -> &mut Option<Value> {
        match name {
            "summary" => &mut self.summary,
            "education" => &mut self.education,
            "experience" => &mut self.experience,
            "skills" => &mut self.skills,
            _ => &mut self.additional_information,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && STRUCTURED_FIELDS.iter().all(|name| self.section(name).is_none())
    }
}

/// How a write treats a missing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Create when missing (all fields required), otherwise update
    CreateOrUpdate,
    /// Missing record is a 404
    UpdateOnly,
}
