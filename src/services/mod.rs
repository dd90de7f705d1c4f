// src/services/mod.rs
//
// Thin clients for the external services used by the conversion adapter

pub mod aws;
pub mod llm;

// Re-export commonly used types for convenience
pub use aws::{AWSError, AWSService};
pub use llm::{ChatCompletionClient, CompletionClient, LlmError};
