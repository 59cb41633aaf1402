//! Error types for tenantgate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    /// No tenant is registered under the requested identifier.
    #[error("Tenant not found: {identifier}")]
    NotFound { identifier: String },

    /// The request host carries no usable subdomain.
    #[error("Malformed host: {host}")]
    Malformed { host: String },

    /// The tenant resolved but its store could not be reached.
    #[error("Tenant store connection failed: {0}")]
    Connection(String),

    #[error("Tenant already exists: {identifier}")]
    DuplicateTenant { identifier: String },

    #[error("Invalid tenant identifier: {identifier:?}")]
    InvalidIdentifier { identifier: String },

    #[error("Creating store for tenant {identifier} failed: {reason}")]
    StorageCreationFailed { identifier: String, reason: String },

    #[error("Persisting tenant {identifier} failed: {reason}")]
    PersistenceFailed { identifier: String, reason: String },

    #[error("Migrating store for tenant {identifier} failed: {reason}")]
    MigrationFailed { identifier: String, reason: String },

    /// The tenant store exists but its record was never persisted. The
    /// store named by `descriptor` is orphaned and needs reconciling.
    #[error(
        "Partial provisioning of tenant {identifier}: store {descriptor} was created \
         but the record was not persisted: {reason}"
    )]
    PartialProvisioning {
        identifier: String,
        descriptor: String,
        reason: String,
    },

    #[error("Locked out for too many login attempts ({remaining_secs}s remaining)")]
    LockedOut { remaining_secs: i64 },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized")]
    Unauthorized,

    #[error("User already exists: {email}")]
    DuplicateUser { email: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GateError {
    /// Whether the failure was caused by the request rather than the
    /// server. Client errors are rejected, never retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GateError::NotFound { .. }
                | GateError::Malformed { .. }
                | GateError::DuplicateTenant { .. }
                | GateError::InvalidIdentifier { .. }
                | GateError::LockedOut { .. }
                | GateError::InvalidCredentials
                | GateError::Unauthorized
                | GateError::DuplicateUser { .. }
                | GateError::Validation { .. }
        )
    }

    /// Short machine-readable kind, used in logs and JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::NotFound { .. } => "not_found",
            GateError::Malformed { .. } => "malformed",
            GateError::Connection(_) => "connection_error",
            GateError::DuplicateTenant { .. } => "duplicate_tenant",
            GateError::InvalidIdentifier { .. } => "invalid_identifier",
            GateError::StorageCreationFailed { .. } => "storage_creation_failed",
            GateError::PersistenceFailed { .. } => "persistence_failed",
            GateError::MigrationFailed { .. } => "migration_failed",
            GateError::PartialProvisioning { .. } => "partial_provisioning",
            GateError::LockedOut { .. } => "locked_out",
            GateError::InvalidCredentials => "invalid_credentials",
            GateError::Unauthorized => "unauthorized",
            GateError::DuplicateUser { .. } => "duplicate_user",
            GateError::Validation { .. } => "validation",
            GateError::Database(_) => "database",
            GateError::Internal(_) => "internal",
        }
    }
}

pub type GateResult<T> = Result<T, GateError>;
