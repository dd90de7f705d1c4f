//! # Resume Module
//!
//! One structured resume per user. `POST`/`PUT` create the record or update
//! the provided fields; `PATCH` only updates.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::resume_routes;
