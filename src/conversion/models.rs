//! Conversion data models

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Resume in the shape produced by the model
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructuredResume {
    pub title: String,
    #[serde(default = "empty_object")]
    pub summary: Value,
    #[serde(default = "empty_object")]
    pub education: Value,
    #[serde(default = "empty_array")]
    pub experience: Value,
    #[serde(default = "empty_array")]
    pub skills: Value,
    #[serde(default = "empty_object")]
    pub additional_information: Value,
}

fn empty_object() -> Value {
    json!({})
}

fn empty_array() -> Value {
    json!([])
}

impl StructuredResume {
    /// Explicit nulls count as missing
    pub fn fill_nulls(mut self) -> Self {
        fill(&mut self.summary, empty_object);
        fill(&mut self.education, empty_object);
        fill(&mut self.experience, empty_array);
        fill(&mut self.skills, empty_array);
        fill(&mut self.additional_information, empty_object);
        self
    }
}

fn fill(field: &mut Value, default: fn() -> Value) {
    if field.is_null() {
        *field = default();
    }
}

/// Where a conversion result came from
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConversionOrigin {
    Fresh,
    Cached,
    Placeholder,
}

#[derive(Serialize, Debug, Clone)]
pub struct ConversionOutcome {
    pub origin: ConversionOrigin,
    pub resume: StructuredResume,
}

/// Body of `POST /resume/convert/`
#[derive(Deserialize, Debug, Default)]
pub struct ConvertRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
}
