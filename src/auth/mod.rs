//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - OAuth provider token login (Google, LinkedIn)
//! - Session token issuance, refresh and verification
//! - Password login for accounts created with `create_user`
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod passwords;
pub mod providers;
pub mod routes;
pub mod services;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
