//! # Conversion Module
//!
//! Unstructured resume text to structured resume, through a chat model.
//! Text comes from a local directory or an S3 bucket; the last result is kept
//! next to it and reused until the text changes. Anything that goes wrong
//! yields a fixed placeholder resume.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod placeholder;
pub mod prompts;
pub mod routes;
pub mod service;
pub mod source;

pub use routes::conversion_routes;
pub use service::ConversionService;
