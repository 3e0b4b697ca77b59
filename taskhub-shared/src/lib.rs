//! # Taskhub Shared Library
//!
//! Domain layer for the Taskhub project-management backend. The HTTP server in
//! `taskhub-api` is a thin shell over the types and services defined here.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and migration runner
//! - `models`: table rows, create inputs, partial-update patches
//! - `auth`: password hashing, JWT tokens, actor resolution, access policy
//! - `services`: policy-checked entity operations and dashboard rollups
//! - `storygen`: user story generation through a text-generation provider

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod storygen;

/// Current version of the Taskhub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
