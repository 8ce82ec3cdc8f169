use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for ModelError {
    fn from(e: sea_orm::DbErr) -> Self { ModelError::Db(e.to_string()) }
}

/// Reject blank required text fields.
pub fn require(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Minimal shape check: `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid {
        return Err(ModelError::Validation("Email should be valid".into()));
    }
    Ok(())
}
