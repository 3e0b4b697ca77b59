/// API route handlers
///
/// Handlers validate the request body, open a connection (a transaction for
/// writes), call the matching service and map its result to a response.

use serde::Deserialize;
use taskhub_shared::models::task::DEFAULT_LIST_LIMIT;

pub mod ai;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

/// `?skip=&limit=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}
