use thiserror::Error;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::FieldErrors;
use crate::filter::FilterError;

/// Failures surfaced by the resource and auth services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{message}")]
    Validation { message: String, field_errors: FieldErrors },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] DatabaseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(label: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", label))
    }

    pub fn validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        ServiceError::Validation { message: message.into(), field_errors }
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        ServiceError::InvalidQuery(err.to_string())
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(msg) => ServiceError::Unauthorized(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
