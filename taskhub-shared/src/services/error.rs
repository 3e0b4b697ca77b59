/// Service-layer errors
///
/// Every service operation returns [`ServiceResult`]. Variants map one to one
/// onto HTTP statuses in the API crate.

use crate::auth::password::PasswordError;
use crate::auth::policy::DenyReason;
use crate::storygen::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Access policy denied the operation
    #[error("{0}")]
    Forbidden(DenyReason),

    /// Input rejected by the service
    #[error("{0}")]
    Validation(String),

    /// Upstream provider is not configured or unreachable
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// Upstream provider failed
    #[error("{0}")]
    Upstream(String),

    /// Database failure; the surrounding transaction is rolled back
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Password hashing failure
    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        ServiceError::Forbidden(reason)
    }
}

impl From<GenerationError> for ServiceError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::NotConfigured(msg) => ServiceError::UpstreamUnavailable(msg),
            GenerationError::Provider(_) => ServiceError::Upstream(err.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
