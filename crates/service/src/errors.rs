use thiserror::Error;

use crate::auth::errors::AuthError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { message: String, field: Option<&'static str> },
    #[error("{0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found with id: {}", entity, id))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict { message: message.into(), field: None }
    }

    pub fn duplicate_email(email: &str) -> Self {
        tracing::debug!(email, "duplicate email rejected");
        Self::Conflict { message: "Email already exists. Please use a different email or login.".into(), field: Some("email") }
    }

    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid email or password.".into())
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => ServiceError::Validation(m),
            AuthError::Unauthorized => ServiceError::invalid_credentials(),
            AuthError::Repository(m) => ServiceError::Db(m),
            other @ (AuthError::HashError(_) | AuthError::TokenError(_)) => ServiceError::Internal(other.to_string()),
        }
    }
}
