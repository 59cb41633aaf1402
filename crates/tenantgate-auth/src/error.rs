//! Authentication error types.

use tenantgate_core::error::GateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("too many login attempts, retry in {remaining_secs}s")]
    LockedOut { remaining_secs: i64 },

    #[error("not authorized")]
    NotAuthorized,

    #[error("email is not in a valid format")]
    InvalidEmail,

    #[error("password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("password must contain a capital letter")]
    PasswordMissingCapital,

    #[error("password must contain a special character")]
    PasswordMissingSpecial,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for GateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => GateError::InvalidCredentials,
            AuthError::LockedOut { remaining_secs } => GateError::LockedOut { remaining_secs },
            AuthError::NotAuthorized => GateError::Unauthorized,
            AuthError::InvalidEmail
            | AuthError::PasswordTooShort { .. }
            | AuthError::PasswordMissingCapital
            | AuthError::PasswordMissingSpecial => GateError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => GateError::Internal(msg),
        }
    }
}
