//! Password verification using Argon2id.

use argon2::{Argon2, PasswordVerifier as _};
use tenantgate_core::error::GateResult;
use tenantgate_core::repository::{CredentialVerifier, UserRepository};
use tracing::debug;

use crate::error::AuthError;

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// `pepper`, when set, is prepended to the password and must match the
/// one used at hashing time. Returns `Ok(false)` on mismatch and
/// [`AuthError::Crypto`] if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// [`CredentialVerifier`] backed by a user repository.
///
/// Used for both dashboards: over the master user table for the host
/// surface and over a tenant's own user table for tenant logins.
#[derive(Clone)]
pub struct PasswordVerifier<U: UserRepository> {
    users: U,
    pepper: Option<String>,
}

impl<U: UserRepository> PasswordVerifier<U> {
    pub fn new(users: U, pepper: Option<String>) -> Self {
        Self { users, pepper }
    }
}

impl<U: UserRepository> CredentialVerifier for PasswordVerifier<U> {
    async fn verify(&self, email: &str, password: &str) -> GateResult<Option<String>> {
        let Some(user) = self.users.get_by_email(email).await? else {
            debug!(email = %email, "No user with this email");
            return Ok(None);
        };

        let valid = verify_password(password, &user.password_hash, self.pepper.as_deref())?;
        Ok(valid.then(|| user.id.to_string()))
    }
}
