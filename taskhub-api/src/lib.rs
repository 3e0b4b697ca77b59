//! # Taskhub API Server Library
//!
//! HTTP layer of the Taskhub project-management backend.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and JWT middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
